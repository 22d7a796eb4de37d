//! Mel spectrogram analysis and rendering.

use std::path::Path;

use image::RgbImage;
use rustfft::{num_complex::Complex, FftPlanner};
use tracing::debug;

use crate::audio::DecodedClip;
use crate::config::SpectrogramConfig;
use crate::error::Result;
use crate::render::{colormap, fill_rect, save_png, BACKGROUND};

/// Pixels reserved at the right edge for the dB colorbar, gap included.
pub const COLORBAR_WIDTH: u32 = 32;
const COLORBAR_GAP: u32 = 8;
const AMIN: f32 = 1e-10;

// Slaney mel scale: linear below 1 kHz, logarithmic above.
const F_SP: f32 = 200.0 / 3.0;
const MIN_LOG_HZ: f32 = 1000.0;
const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;

fn logstep() -> f32 {
  6.4f32.ln() / 27.0
}

pub fn hz_to_mel(hz: f32) -> f32 {
  if hz >= MIN_LOG_HZ {
    MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / logstep()
  } else {
    hz / F_SP
  }
}

pub fn mel_to_hz(mel: f32) -> f32 {
  if mel >= MIN_LOG_MEL {
    MIN_LOG_HZ * (logstep() * (mel - MIN_LOG_MEL)).exp()
  } else {
    F_SP * mel
  }
}

/// Triangular mel filters over the `n_fft / 2 + 1` FFT bins, each scaled to
/// unit area.
pub fn mel_filterbank(sample_rate: u32, n_fft: usize, n_mels: usize, fmax: f32) -> Vec<Vec<f32>> {
  let bins = n_fft / 2 + 1;
  let fft_freqs = (0..bins)
    .map(|k| k as f32 * sample_rate as f32 / n_fft as f32)
    .collect::<Vec<f32>>();
  let mel_max = hz_to_mel(fmax);
  let hz_points = (0..n_mels + 2)
    .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
    .collect::<Vec<f32>>();

  (0..n_mels)
    .map(|m| {
      let (lo, center, hi) = (hz_points[m], hz_points[m + 1], hz_points[m + 2]);
      let enorm = 2.0 / (hi - lo);
      fft_freqs
        .iter()
        .map(|&f| {
          let lower = (f - lo) / (center - lo);
          let upper = (hi - f) / (hi - center);
          lower.min(upper).max(0.0) * enorm
        })
        .collect()
    })
    .collect()
}

fn periodic_hann(n: usize) -> Vec<f32> {
  (0..n)
    .map(|i| 0.5 - 0.5 * (std::f32::consts::TAU * i as f32 / n as f32).cos())
    .collect()
}

/// Converts power to decibels relative to the loudest cell, floored at `-top_db`.
fn power_to_db(power: &[f32], top_db: f32) -> Vec<f32> {
  let reference = power.iter().copied().fold(AMIN, f32::max);
  let ref_db = 10.0 * reference.log10();
  power
    .iter()
    .map(|p| (10.0 * p.max(AMIN).log10() - ref_db).max(-top_db))
    .collect()
}

pub struct MelSpectrogram {
  pub frames: usize,
  pub n_mels: usize,
  pub hop: usize,
  pub sample_rate: u32,
  pub fmax: f32,
  pub top_db: f32,
  /// Frame-major dB values, `frames * n_mels` long.
  pub values_db: Vec<f32>,
}

impl MelSpectrogram {
  pub fn compute(samples: &[f32], sample_rate: u32, cfg: &SpectrogramConfig) -> MelSpectrogram {
    let n_fft = cfg.n_fft;
    let bins = n_fft / 2 + 1;
    let fmax = cfg.fmax.min(sample_rate as f32 / 2.0);
    let filters = mel_filterbank(sample_rate, n_fft, cfg.n_mels, fmax);
    let window = periodic_hann(n_fft);
    let frames = 1 + samples.len() / cfg.hop;
    let pad = n_fft / 2;

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let mut buffer = vec![Complex { re: 0.0, im: 0.0 }; n_fft];
    let mut power = vec![0.0f32; bins];
    let mut mel = Vec::with_capacity(frames * cfg.n_mels);

    for frame in 0..frames {
      let start = frame * cfg.hop;
      for (i, slot) in buffer.iter_mut().enumerate() {
        let sample = (start + i)
          .checked_sub(pad)
          .and_then(|j| samples.get(j))
          .copied()
          .unwrap_or(0.0);
        *slot = Complex {
          re: sample * window[i],
          im: 0.0,
        };
      }
      fft.process(&mut buffer);
      for (p, c) in power.iter_mut().zip(&buffer) {
        *p = c.norm_sqr();
      }
      for filter in &filters {
        mel.push(filter.iter().zip(&power).map(|(w, p)| w * p).sum::<f32>());
      }
    }

    debug!(frames, n_mels = cfg.n_mels, fmax, "computed mel spectrogram");
    MelSpectrogram {
      frames,
      n_mels: cfg.n_mels,
      hop: cfg.hop,
      sample_rate,
      fmax,
      top_db: cfg.top_db,
      values_db: power_to_db(&mel, cfg.top_db),
    }
  }

  pub fn get(&self, frame: usize, mel: usize) -> f32 {
    self.values_db[frame * self.n_mels + mel]
  }

  /// Mel bin holding the most energy in `frame`.
  pub fn loudest_bin(&self, frame: usize) -> usize {
    (0..self.n_mels)
      .max_by(|a, b| self.get(frame, *a).total_cmp(&self.get(frame, *b)))
      .unwrap_or(0)
  }
}

/// Draws the spectrogram as a heatmap with low frequencies at the bottom and
/// a dB colorbar on the right.
pub fn render(spec: &MelSpectrogram, cfg: &SpectrogramConfig) -> RgbImage {
  let (width, height) = (cfg.width, cfg.height);
  let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
  let plot_width = width.saturating_sub(COLORBAR_WIDTH).max(1);

  if spec.frames > 0 && spec.n_mels > 0 {
    for x in 0..plot_width.min(width) {
      let frame = (x as usize * spec.frames / plot_width as usize).min(spec.frames - 1);
      for y in 0..height {
        let row = (height - 1 - y) as usize;
        let mel = (row * spec.n_mels / height as usize).min(spec.n_mels - 1);
        let level = 1.0 + spec.get(frame, mel) / spec.top_db;
        img.put_pixel(x, y, colormap(level));
      }
    }
  }

  let bar_x = plot_width + COLORBAR_GAP;
  for y in 0..height {
    let level = 1.0 - y as f32 / (height.max(2) - 1) as f32;
    fill_rect(&mut img, bar_x, y, width, y + 1, colormap(level));
  }
  img
}

/// Computes and writes the mel spectrogram of `clip` to `path`.
pub fn write_spectrogram(clip: &DecodedClip, cfg: &SpectrogramConfig, path: &Path) -> Result<()> {
  let spec = MelSpectrogram::compute(&clip.samples, clip.sample_rate, cfg);
  save_png(&render(&spec, cfg), path)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tone(freq: f32, sample_rate: u32, secs: f32) -> Vec<f32> {
    let len = (sample_rate as f32 * secs) as usize;
    (0..len)
      .map(|i| (i as f32 * freq * std::f32::consts::TAU / sample_rate as f32).sin() * 0.5)
      .collect()
  }

  #[test]
  fn mel_scale_round_trips() {
    for hz in [0.0, 250.0, 999.0, 1000.0, 4000.0, 8000.0] {
      assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 0.5, "{hz}");
    }
    assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-4);
  }

  #[test]
  fn filterbank_shape() {
    let bank = mel_filterbank(22_050, 2048, 128, 8000.0);
    assert_eq!(bank.len(), 128);
    assert!(bank.iter().all(|f| f.len() == 1025));
    assert!(bank.iter().flatten().all(|w| *w >= 0.0));
    assert!(bank.iter().all(|f| f.iter().any(|w| *w > 0.0)));
  }

  #[test]
  fn frame_count_follows_hop() {
    let cfg = SpectrogramConfig::default();
    let spec = MelSpectrogram::compute(&vec![0.0; 5120], 16_000, &cfg);
    assert_eq!(spec.frames, 11);
    assert_eq!(spec.values_db.len(), 11 * 128);
  }

  #[test]
  fn db_values_are_bounded() {
    let cfg = SpectrogramConfig::default();
    let spec = MelSpectrogram::compute(&tone(440.0, 16_000, 0.5), 16_000, &cfg);
    assert!(spec.values_db.iter().all(|v| *v <= 0.0 && *v >= -cfg.top_db));
    assert!(spec.values_db.iter().any(|v| *v == 0.0));
  }

  #[test]
  fn tone_peaks_at_expected_mel_bin() {
    let cfg = SpectrogramConfig::default();
    let spec = MelSpectrogram::compute(&tone(1000.0, 16_000, 0.5), 16_000, &cfg);
    let mel_max = hz_to_mel(8000.0);
    let expected = hz_to_mel(1000.0) / mel_max * (cfg.n_mels + 1) as f32 - 1.0;
    let got = spec.loudest_bin(spec.frames / 2) as f32;
    assert!((got - expected).abs() <= 2.0, "got {got}, expected {expected}");
  }

  #[test]
  fn fmax_is_capped_at_nyquist() {
    let cfg = SpectrogramConfig::default();
    let spec = MelSpectrogram::compute(&vec![0.0; 1024], 8000, &cfg);
    assert_eq!(spec.fmax, 4000.0);
  }

  #[test]
  fn render_has_configured_size() {
    let cfg = SpectrogramConfig {
      width: 200,
      height: 80,
      ..SpectrogramConfig::default()
    };
    let spec = MelSpectrogram::compute(&tone(440.0, 16_000, 0.25), 16_000, &cfg);
    let img = render(&spec, &cfg);
    assert_eq!(img.dimensions(), (200, 80));
    // colorbar: bright at the top, dark at the bottom
    assert_eq!(*img.get_pixel(199, 0), colormap(1.0));
    assert_eq!(*img.get_pixel(199, 79), colormap(0.0));
  }
}
