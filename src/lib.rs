pub mod app;
pub mod audio;
pub mod clips;
pub mod config;
pub mod error;
pub mod frames;
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod search;
pub mod spectrogram;
pub mod spectrum;
pub mod ui;
pub mod video;

pub use error::{Error, Result};

pub const NUM_BARS: usize = 48;
pub const TICK_RATE: u64 = 50;
pub const HANN_WINDOW_SIZE: usize = 2048;

pub const SUPPORTED_FORMATS: [&str; 5] = ["mp3", "flac", "ogg", "wav", "aac"];

/// Bands of the live visualizer shown while a clip plays.
pub const LIVE_BANDS: spectrum::Bands = spectrum::Bands {
  count: NUM_BARS,
  min_freq: 40.0,
  max_freq: 5000.0,
};
