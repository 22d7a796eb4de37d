use spectrum_analyzer::scaling::divide_by_N;
use spectrum_analyzer::windows::hann_window;
use spectrum_analyzer::{samples_fft_to_spectrum, FrequencyLimit};

use crate::audio::ClipSource;
use crate::error::{Error, Result};

/// Largest slice handed to the FFT; longer slices are truncated.
pub const MAX_FFT_LEN: usize = 16384;

/// Equal-width frequency bands that a magnitude spectrum is summed into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
  pub count: usize,
  pub min_freq: f32,
  pub max_freq: f32,
}

/// Magnitude spectrum of `samples`, summed into `bands`.
///
/// The slice is Hann-windowed, zero-padded to a power of two and scaled by
/// `1/N`. Frequencies above Nyquist are ignored, so a band layout wider than
/// the clip's bandwidth leaves its top bands empty.
pub fn band_magnitudes(samples: &[f32], sample_rate: u32, bands: &Bands) -> Result<Vec<f32>> {
  let mut out = vec![0.0; bands.count];
  let nyquist = sample_rate as f32 / 2.0;
  let max_freq = bands.max_freq.min(nyquist);
  if samples.is_empty() || bands.count == 0 || bands.min_freq >= max_freq {
    return Ok(out);
  }

  let len = samples.len().min(MAX_FFT_LEN);
  let mut windowed = hann_window(&samples[..len]);
  windowed.resize(len.next_power_of_two().max(4), 0.0);

  let spectrum = samples_fft_to_spectrum(
    &windowed,
    sample_rate,
    FrequencyLimit::Range(bands.min_freq, max_freq),
    Some(&divide_by_N),
  )
  .map_err(|e| Error::Spectrum(format!("{:?}", e)))?;

  let width = bands.max_freq - bands.min_freq;
  for (fr, fr_val) in spectrum.data().iter() {
    let band = ((fr.val() - bands.min_freq) * bands.count as f32 / width) as usize;
    out[band.min(bands.count - 1)] += fr_val.val();
  }
  Ok(out)
}

/// Live spectrum of a playing clip, advanced in step with the UI tick.
pub struct Analyzer {
  sample_rate: u32,
  channels: u64,
  buf: Vec<f32>,
  source: Box<dyn rodio::Source<Item = f32> + Send + 'static>,
  bands: Bands,
  data: Vec<f32>,
}

impl Analyzer {
  pub fn new<S>(source: S, bands: Bands) -> Analyzer
  where
    S: rodio::Source<Item = f32> + Send + 'static,
  {
    Analyzer {
      channels: source.channels() as u64,
      sample_rate: source.sample_rate(),
      buf: vec![0.0; crate::HANN_WINDOW_SIZE],
      source: Box::new(source),
      bands,
      data: vec![0.0; bands.count],
    }
  }

  pub fn from_clip(source: ClipSource) -> Analyzer {
    Analyzer::new(source, crate::LIVE_BANDS)
  }

  /// Consumes the samples played during the last `elapsed` milliseconds.
  pub fn on_tick(&mut self, elapsed: u32) {
    let num_samples = (self.sample_rate as u64 * elapsed as u64 / 1000) as usize;
    for i in 0..num_samples {
      let data = self.source.next().unwrap_or_default();
      if i < self.buf.len() {
        self.buf[i] = data
      }
      for _ in 0..self.channels.saturating_sub(1) {
        self.source.next();
      }
    }
    match band_magnitudes(&self.buf, self.sample_rate, &self.bands) {
      Ok(data) => self.data = data,
      Err(e) => tracing::debug!("live spectrum skipped: {}", e),
    }
  }

  pub fn spectrum(&self) -> &[f32] {
    &self.data
  }
}
