use std::{
  fs::File,
  io::BufReader,
  path::Path,
  time::Duration,
};

use rodio::{source::SamplesConverter, Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::debug;

use crate::error::{Error, Result};

pub type ClipSource = SamplesConverter<Decoder<BufReader<File>>, f32>;

/// A fully decoded clip, mixed down to one channel.
#[derive(Debug, Clone)]
pub struct DecodedClip {
  pub samples: Vec<f32>,
  pub sample_rate: u32,
  /// Channel count of the file before mixdown.
  pub channels: u16,
}

impl DecodedClip {
  pub fn duration(&self) -> Duration {
    if self.sample_rate == 0 {
      return Duration::ZERO;
    }
    Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
  }
}

/// Opens `path` as a streaming source of `f32` samples.
pub fn open_source<P: AsRef<Path>>(path: P) -> Result<ClipSource> {
  let path = path.as_ref();
  let file = BufReader::new(File::open(path).map_err(|e| Error::io(path, e))?);
  let decoder = Decoder::new(file).map_err(|e| Error::Decode {
    path: path.to_path_buf(),
    message: e.to_string(),
  })?;
  Ok(decoder.convert_samples::<f32>())
}

/// Decodes the whole clip and averages its channels.
pub fn decode_mono<P: AsRef<Path>>(path: P) -> Result<DecodedClip> {
  let path = path.as_ref();
  let source = open_source(path)?;
  let channels = source.channels();
  let sample_rate = source.sample_rate();
  let interleaved = source.collect::<Vec<f32>>();
  let samples = mixdown(&interleaved, channels);
  if samples.is_empty() {
    return Err(Error::EmptyClip(path.to_path_buf()));
  }
  debug!(
    channels,
    sample_rate,
    samples = samples.len(),
    "decoded {}",
    path.display()
  );
  Ok(DecodedClip {
    samples,
    sample_rate,
    channels,
  })
}

/// Averages interleaved frames down to mono. A trailing partial frame is dropped.
pub fn mixdown(interleaved: &[f32], channels: u16) -> Vec<f32> {
  let channels = channels.max(1) as usize;
  if channels == 1 {
    return interleaved.to_vec();
  }
  interleaved
    .chunks_exact(channels)
    .map(|frame| frame.iter().sum::<f32>() / channels as f32)
    .collect()
}

/// Handle to the default audio output device.
pub struct Player {
  _stream: OutputStream,
  handle: OutputStreamHandle,
}

impl Player {
  pub fn try_default() -> Result<Player> {
    let (stream, handle) =
      OutputStream::try_default().map_err(|e| Error::Playback(e.to_string()))?;
    Ok(Player {
      _stream: stream,
      handle,
    })
  }

  /// Starts playing `path`; the returned sink keeps playing in the background.
  pub fn play(&self, path: &Path) -> Result<Sink> {
    let file = BufReader::new(File::open(path).map_err(|e| Error::io(path, e))?);
    self
      .handle
      .play_once(file)
      .map_err(|e| Error::Playback(format!("{}: {}", path.display(), e)))
  }
}
