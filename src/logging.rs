use std::{fs::File, path::Path, sync::Mutex};

use anyhow::{anyhow, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "clipscope=info";

fn env_filter() -> EnvFilter {
  EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Logs to stderr, for batch runs.
pub fn init_stderr() -> anyhow::Result<()> {
  tracing_subscriber::registry()
    .with(env_filter())
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .try_init()
    .map_err(|e| anyhow!("could not install logger: {}", e))
}

/// Logs to `path`, keeping the terminal free for the UI.
pub fn init_file(path: &Path) -> anyhow::Result<()> {
  if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
  }
  let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
  tracing_subscriber::registry()
    .with(env_filter())
    .with(
      tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file)),
    )
    .try_init()
    .map_err(|e| anyhow!("could not install logger: {}", e))
}
