//! Errors raised while cataloguing, decoding and rendering clips.

use std::path::PathBuf;
use std::process::ExitStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("failed to access '{path}': {source}")]
  Io {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("failed to read transcript table '{path}': {source}")]
  Transcript { path: PathBuf, source: csv::Error },

  #[error("failed to decode '{path}': {message}")]
  Decode { path: PathBuf, message: String },

  #[error("audio output unavailable: {0}")]
  Playback(String),

  #[error("clip '{0}' contains no audio samples")]
  EmptyClip(PathBuf),

  #[error("spectrum analysis failed: {0}")]
  Spectrum(String),

  #[error("failed to write image '{path}': {source}")]
  Image {
    path: PathBuf,
    source: image::ImageError,
  },

  #[error("failed to start {tool}: {source}")]
  ToolSpawn {
    tool: String,
    source: std::io::Error,
  },

  #[error("{tool} exited with {status}: {stderr}")]
  ToolFailed {
    tool: String,
    status: ExitStatus,
    stderr: String,
  },

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("no supported audio clips found in '{0}'")]
  NoClips(PathBuf),

  #[error("render worker panicked")]
  WorkerPanicked,
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Error::Io {
      path: path.into(),
      source,
    }
  }
}
