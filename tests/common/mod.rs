#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn make_temp_dir(tag: &str) -> PathBuf {
  static NEXT_ID: AtomicU64 = AtomicU64::new(1);
  let now_ms = SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_millis())
    .unwrap_or(0);
  let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
  let mut dir = std::env::temp_dir();
  dir.push(format!(
    "clipscope_{tag}_{}_{}_{}",
    std::process::id(),
    now_ms,
    seq
  ));
  std::fs::create_dir_all(&dir).expect("create temp test dir");
  dir
}

/// Writes a 16-bit sine tone and returns the number of frames written.
pub fn write_tone(path: &Path, sample_rate: u32, channels: u16, freq: f32, frames: usize) -> usize {
  let spec = hound::WavSpec {
    channels,
    sample_rate,
    bits_per_sample: 16,
    sample_format: hound::SampleFormat::Int,
  };
  let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
  for i in 0..frames {
    let t = i as f32 / sample_rate as f32;
    let v = (t * freq * std::f32::consts::TAU).sin() * 0.5;
    for _ in 0..channels {
      writer
        .write_sample((v * i16::MAX as f32) as i16)
        .expect("write sample");
    }
  }
  writer.finalize().expect("finalize wav");
  frames
}

pub fn write_transcript(path: &Path, rows: &[(&str, &str)]) {
  let mut body = String::from("speaker,text\n");
  for (speaker, text) in rows {
    body.push_str(&format!("{},\"{}\"\n", speaker, text));
  }
  std::fs::write(path, body).expect("write transcript");
}
