use anyhow::{bail, Context};
use clap::Parser;
use clipscope::{
  audio::Player,
  clips::load_catalog,
  config::{Config, RenderKind},
  pipeline::RenderJob,
};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Parser)]
#[clap(version, about = "Browse labeled audio clips, play them and render their spectra")]
struct Args {
  /// Directory holding the audio clips.
  #[clap(long, default_value = "sentences/clips")]
  clips: PathBuf,
  /// CSV table with one row per clip; the first two columns form its label.
  #[clap(long, default_value = "sentences/transc.csv")]
  transcript: PathBuf,
  /// Where spectrograms and videos are written.
  #[clap(short, long, default_value = "output")]
  output: PathBuf,
  /// Which outputs to render for a clip.
  #[clap(long, arg_enum, default_value = "both")]
  render: RenderKind,
  /// Frame rate of the spectrum video.
  #[clap(long, default_value_t = 30)]
  fps: u32,
  /// Video frame width in pixels.
  #[clap(long, default_value_t = 640)]
  width: u32,
  /// Video frame height in pixels.
  #[clap(long, default_value_t = 360)]
  height: u32,
  /// ffmpeg executable used to encode and mux the video.
  #[clap(long, default_value = "ffmpeg")]
  ffmpeg: PathBuf,
  /// Keep the rendered frames and the silent video.
  #[clap(long)]
  keep_temp: bool,
  /// Change color based on the clip
  #[clap(short, long)]
  color: bool,
  /// Print the clip list and exit.
  #[clap(long)]
  list: bool,
  /// Render the clip with this index without starting the UI.
  #[clap(long)]
  clip: Option<usize>,
  /// With --clip, play the clip while it renders.
  #[clap(long, requires = "clip")]
  play: bool,
  /// Log file used while the UI is running.
  #[clap(long)]
  log_file: Option<PathBuf>,
}

impl Args {
  fn config(&self) -> Config {
    let mut config = Config {
      clips_dir: self.clips.clone(),
      transcript: self.transcript.clone(),
      output_dir: self.output.clone(),
      color: self.color,
      ..Config::default()
    };
    config.frames.fps = self.fps;
    config.frames.width = self.width;
    config.frames.height = self.height;
    config.video.ffmpeg = self.ffmpeg.clone();
    config.video.keep_temp = self.keep_temp;
    config
  }
}

fn main() -> anyhow::Result<()> {
  let args = Args::parse();
  let config = args.config();

  let interactive = !args.list && args.clip.is_none();
  if interactive {
    let log_file = args
      .log_file
      .clone()
      .unwrap_or_else(|| config.output_dir.join("clipscope.log"));
    clipscope::logging::init_file(&log_file)?;
  } else {
    clipscope::logging::init_stderr()?;
  }

  config.validate()?;
  let clips = load_catalog(&config.clips_dir, &config.transcript)?;

  if args.list {
    for (i, clip) in clips.iter().enumerate() {
      println!("{}: {} ({})", i, clip.label, clip.file_name());
    }
    return Ok(());
  }

  if let Some(index) = args.clip {
    let Some(clip) = clips.get(index).cloned() else {
      bail!("clip index {} out of range (0..{})", index, clips.len());
    };
    println!("{}", clip.label);
    let job = RenderJob::spawn(clip.clone(), config, args.render);
    let (played, rendered) = job.run_alongside(|| {
      if args.play {
        let player = Player::try_default()?;
        player.play(&clip.path)?.sleep_until_end();
      }
      Ok(())
    });
    if let Err(e) = played {
      warn!("could not play {}: {}", clip.file_name(), e);
    }
    let artifacts = rendered.with_context(|| format!("rendering {}", clip.file_name()))?;
    for path in [artifacts.spectrogram, artifacts.video].into_iter().flatten() {
      println!("wrote {}", path.display());
    }
    return Ok(());
  }

  clipscope::app::run(clips, config, args.render)
}
