//! Spectral-magnitude animation frames.
//!
//! The clip is cut into fixed-size, non-overlapping slices, one per video
//! frame, and each slice is drawn as a bar plot of its band magnitudes.

use std::path::{Path, PathBuf};

use image::RgbImage;
use tracing::debug;

use crate::audio::DecodedClip;
use crate::config::FrameConfig;
use crate::error::{Error, Result};
use crate::render::{colormap, fill_rect, save_png, BACKGROUND};
use crate::spectrum::band_magnitudes;

/// Printf-style pattern of the frame files, as handed to ffmpeg.
pub const FRAME_PATTERN: &str = "frame_%05d.png";

pub fn samples_per_frame(sample_rate: u32, fps: u32) -> usize {
  ((sample_rate as f64 / fps.max(1) as f64).round() as usize).max(1)
}

pub fn frame_count(len: usize, sample_rate: u32, fps: u32) -> usize {
  len.div_ceil(samples_per_frame(sample_rate, fps))
}

pub fn frame_path(dir: &Path, index: usize) -> PathBuf {
  dir.join(format!("frame_{:05}.png", index))
}

/// Band magnitudes for every frame of the clip. The last slice is zero-padded
/// to full length.
pub fn compute_frame_spectra(clip: &DecodedClip, cfg: &FrameConfig) -> Result<Vec<Vec<f32>>> {
  let spf = samples_per_frame(clip.sample_rate, cfg.fps);
  let mut padded = vec![0.0; spf];
  clip
    .samples
    .chunks(spf)
    .map(|slice| {
      if slice.len() == spf {
        band_magnitudes(slice, clip.sample_rate, &cfg.bands)
      } else {
        padded[..slice.len()].copy_from_slice(slice);
        padded[slice.len()..].fill(0.0);
        band_magnitudes(&padded, clip.sample_rate, &cfg.bands)
      }
    })
    .collect()
}

/// Largest band magnitude across all frames.
pub fn peak(spectra: &[Vec<f32>]) -> f32 {
  spectra
    .iter()
    .flatten()
    .copied()
    .fold(0.0, f32::max)
}

/// Draws one frame: a bar per band, scaled against `peak`.
pub fn render_frame(bands: &[f32], peak: f32, cfg: &FrameConfig) -> RgbImage {
  let (width, height) = (cfg.width, cfg.height);
  let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
  if bands.is_empty() {
    return img;
  }
  let slot = width as f32 / bands.len() as f32;
  let gap = if slot >= 4.0 { 1 } else { 0 };
  for (i, value) in bands.iter().enumerate() {
    let level = if peak > 0.0 { (value / peak).clamp(0.0, 1.0) } else { 0.0 };
    let bar_height = (level * height as f32).round() as u32;
    if bar_height == 0 {
      continue;
    }
    let x0 = (i as f32 * slot).round() as u32;
    let x1 = (((i + 1) as f32 * slot).round() as u32).saturating_sub(gap).max(x0 + 1);
    fill_rect(&mut img, x0, height - bar_height, x1, height, colormap(0.25 + 0.75 * level));
  }
  img
}

/// Renders every frame into a fresh `dir`, reporting `(done, total)` after each one.
pub fn write_frames(
  spectra: &[Vec<f32>],
  dir: &Path,
  cfg: &FrameConfig,
  mut progress: impl FnMut(usize, usize),
) -> Result<usize> {
  // stale frames from a longer render would extend ffmpeg's sequence
  if dir.exists() {
    std::fs::remove_dir_all(dir).map_err(|e| Error::io(dir, e))?;
  }
  std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
  let peak = peak(spectra);
  let total = spectra.len();
  for (i, bands) in spectra.iter().enumerate() {
    save_png(&render_frame(bands, peak, cfg), &frame_path(dir, i))?;
    progress(i + 1, total);
  }
  debug!(frames = total, peak, "wrote frames to {}", dir.display());
  Ok(total)
}
