use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::spectrum::Bands;

/// What a render job produces for a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ArgEnum)]
pub enum RenderKind {
  Spectrogram,
  Video,
  Both,
}

impl RenderKind {
  pub fn wants_spectrogram(self) -> bool {
    matches!(self, RenderKind::Spectrogram | RenderKind::Both)
  }

  pub fn wants_video(self) -> bool {
    matches!(self, RenderKind::Video | RenderKind::Both)
  }
}

/// Mel spectrogram analysis and image settings.
#[derive(Debug, Clone)]
pub struct SpectrogramConfig {
  pub n_fft: usize,
  pub hop: usize,
  pub n_mels: usize,
  pub fmax: f32,
  pub top_db: f32,
  pub width: u32,
  pub height: u32,
}

impl Default for SpectrogramConfig {
  fn default() -> Self {
    SpectrogramConfig {
      n_fft: 2048,
      hop: 512,
      n_mels: 128,
      fmax: 8000.0,
      top_db: 80.0,
      width: 1000,
      height: 400,
    }
  }
}

/// Animation frame settings.
#[derive(Debug, Clone)]
pub struct FrameConfig {
  pub fps: u32,
  pub width: u32,
  pub height: u32,
  pub bands: Bands,
}

impl Default for FrameConfig {
  fn default() -> Self {
    FrameConfig {
      fps: 30,
      width: 640,
      height: 360,
      bands: Bands {
        count: 64,
        min_freq: 40.0,
        max_freq: 8000.0,
      },
    }
  }
}

#[derive(Debug, Clone)]
pub struct VideoConfig {
  pub ffmpeg: PathBuf,
  pub keep_temp: bool,
}

impl Default for VideoConfig {
  fn default() -> Self {
    VideoConfig {
      ffmpeg: PathBuf::from("ffmpeg"),
      keep_temp: false,
    }
  }
}

#[derive(Debug, Clone)]
pub struct Config {
  pub clips_dir: PathBuf,
  pub transcript: PathBuf,
  pub output_dir: PathBuf,
  pub spectrogram: SpectrogramConfig,
  pub frames: FrameConfig,
  pub video: VideoConfig,
  /// Derive the UI color from the clip name instead of using the default.
  pub color: bool,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      clips_dir: PathBuf::from("sentences/clips"),
      transcript: PathBuf::from("sentences/transc.csv"),
      output_dir: PathBuf::from("output"),
      spectrogram: SpectrogramConfig::default(),
      frames: FrameConfig::default(),
      video: VideoConfig::default(),
      color: false,
    }
  }
}

impl Config {
  pub fn validate(&self) -> Result<()> {
    let frames = &self.frames;
    if frames.fps == 0 {
      return Err(invalid("fps must be greater than zero"));
    }
    if frames.width == 0 || frames.height == 0 {
      return Err(invalid("frame size must be non-zero"));
    }
    // yuv420p needs even dimensions
    if frames.width % 2 != 0 || frames.height % 2 != 0 {
      return Err(invalid(format!(
        "frame size {}x{} must have even dimensions",
        frames.width, frames.height
      )));
    }
    if frames.bands.count == 0 {
      return Err(invalid("at least one spectrum band is required"));
    }
    if !(frames.bands.min_freq >= 0.0 && frames.bands.min_freq < frames.bands.max_freq) {
      return Err(invalid(format!(
        "band range {}..{} Hz is empty",
        frames.bands.min_freq, frames.bands.max_freq
      )));
    }

    let spec = &self.spectrogram;
    if spec.n_fft < 2 {
      return Err(invalid("n_fft must be at least 2"));
    }
    if spec.hop == 0 {
      return Err(invalid("hop length must be greater than zero"));
    }
    if spec.n_mels == 0 {
      return Err(invalid("n_mels must be greater than zero"));
    }
    if spec.fmax <= 0.0 || spec.top_db <= 0.0 {
      return Err(invalid("fmax and top_db must be positive"));
    }
    if spec.height == 0 || spec.width <= crate::spectrogram::COLORBAR_WIDTH {
      return Err(invalid(format!(
        "spectrogram image must be wider than {} pixels",
        crate::spectrogram::COLORBAR_WIDTH
      )));
    }
    Ok(())
  }
}

fn invalid(msg: impl Into<String>) -> Error {
  Error::InvalidConfig(msg.into())
}
