//! Raster helpers shared by the spectrogram and frame renderers.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::error::{Error, Result};

pub const BACKGROUND: Rgb<u8> = Rgb([12, 12, 16]);

/// Magma-like gradient stops, dark to bright.
const STOPS: [(f32, [u8; 3]); 5] = [
  (0.0, [0, 0, 4]),
  (0.25, [81, 18, 124]),
  (0.5, [183, 55, 121]),
  (0.75, [252, 137, 97]),
  (1.0, [252, 253, 191]),
];

/// Maps `t` in `0.0..=1.0` onto the gradient. Values outside are clamped.
pub fn colormap(t: f32) -> Rgb<u8> {
  let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
  for pair in STOPS.windows(2) {
    let (t0, c0) = pair[0];
    let (t1, c1) = pair[1];
    if t <= t1 {
      let f = (t - t0) / (t1 - t0);
      let mut px = [0u8; 3];
      for i in 0..3 {
        px[i] = (c0[i] as f32 + (c1[i] as f32 - c0[i] as f32) * f).round() as u8;
      }
      return Rgb(px);
    }
  }
  Rgb(STOPS[STOPS.len() - 1].1)
}

/// Fills the half-open rectangle `[x0, x1) x [y0, y1)`, clipped to the image.
pub fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
  let x1 = x1.min(img.width());
  let y1 = y1.min(img.height());
  for y in y0..y1 {
    for x in x0..x1 {
      img.put_pixel(x, y, color);
    }
  }
}

pub fn save_png(img: &RgbImage, path: &Path) -> Result<()> {
  img.save(path).map_err(|source| Error::Image {
    path: path.to_path_buf(),
    source,
  })
}
