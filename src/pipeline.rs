//! The per-clip render chain and the worker thread that runs it.

use std::{
  path::{Path, PathBuf},
  sync::mpsc::{self, Receiver},
  thread::{self, JoinHandle},
};

use tracing::info;

use crate::audio::decode_mono;
use crate::clips::Clip;
use crate::config::{Config, RenderKind};
use crate::error::{Error, Result};
use crate::frames::{compute_frame_spectra, write_frames};
use crate::spectrogram::write_spectrogram;
use crate::video::{Ffmpeg, TempArtifacts};

/// Progress of a render, in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
  Decoding,
  Spectrogram,
  Frames { done: usize, total: usize },
  Encoding,
  Muxing,
  Cleanup,
}

impl std::fmt::Display for Stage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Stage::Decoding => write!(f, "decoding audio"),
      Stage::Spectrogram => write!(f, "drawing spectrogram"),
      Stage::Frames { done, total } => write!(f, "rendering frames {}/{}", done, total),
      Stage::Encoding => write!(f, "encoding video"),
      Stage::Muxing => write!(f, "muxing audio"),
      Stage::Cleanup => write!(f, "removing temporary files"),
    }
  }
}

/// Files written by a render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
  pub spectrogram: Option<PathBuf>,
  pub video: Option<PathBuf>,
}

/// Where a clip's outputs and intermediates go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
  pub spectrogram: PathBuf,
  pub video: PathBuf,
  pub frames_dir: PathBuf,
  pub silent_video: PathBuf,
}

impl OutputPaths {
  pub fn for_clip(output_dir: &Path, clip: &Clip) -> OutputPaths {
    let stem = clip.stem();
    OutputPaths {
      spectrogram: output_dir.join(format!("{}_spectrogram.png", stem)),
      video: output_dir.join(format!("{}.mp4", stem)),
      frames_dir: output_dir.join(format!(".{}_frames", stem)),
      silent_video: output_dir.join(format!("{}_silent.mp4", stem)),
    }
  }
}

/// Decodes `clip` and writes the outputs `kind` asks for.
pub fn render_clip(
  clip: &Clip,
  config: &Config,
  kind: RenderKind,
  progress: &mut dyn FnMut(Stage),
) -> Result<Artifacts> {
  let out_dir = &config.output_dir;
  std::fs::create_dir_all(out_dir).map_err(|e| Error::io(out_dir, e))?;
  let paths = OutputPaths::for_clip(out_dir, clip);
  let mut artifacts = Artifacts::default();

  progress(Stage::Decoding);
  let decoded = decode_mono(&clip.path)?;
  info!(
    "rendering {} ({:.2}s at {} Hz)",
    clip.file_name(),
    decoded.duration().as_secs_f32(),
    decoded.sample_rate
  );

  if kind.wants_spectrogram() {
    progress(Stage::Spectrogram);
    write_spectrogram(&decoded, &config.spectrogram, &paths.spectrogram)?;
    info!("wrote {}", paths.spectrogram.display());
    artifacts.spectrogram = Some(paths.spectrogram.clone());
  }

  if kind.wants_video() {
    let mut temp = TempArtifacts::new(config.video.keep_temp);
    temp.track(&paths.frames_dir);
    temp.track(&paths.silent_video);

    let spectra = compute_frame_spectra(&decoded, &config.frames)?;
    progress(Stage::Frames {
      done: 0,
      total: spectra.len(),
    });
    write_frames(&spectra, &paths.frames_dir, &config.frames, |done, total| {
      progress(Stage::Frames { done, total })
    })?;

    let ffmpeg = Ffmpeg::new(&config.video.ffmpeg);
    progress(Stage::Encoding);
    ffmpeg.encode_frames(&paths.frames_dir, config.frames.fps, &paths.silent_video)?;
    progress(Stage::Muxing);
    ffmpeg.mux(&paths.silent_video, &clip.path, &paths.video)?;
    info!("wrote {}", paths.video.display());
    artifacts.video = Some(paths.video.clone());

    progress(Stage::Cleanup);
    drop(temp);
  }

  Ok(artifacts)
}

/// A render running on its own thread.
pub struct RenderJob {
  clip: Clip,
  handle: JoinHandle<Result<Artifacts>>,
  progress: Receiver<Stage>,
}

impl RenderJob {
  pub fn spawn(clip: Clip, config: Config, kind: RenderKind) -> RenderJob {
    let (tx, rx) = mpsc::channel();
    let worker_clip = clip.clone();
    let handle = thread::spawn(move || {
      render_clip(&worker_clip, &config, kind, &mut |stage: Stage| {
        let _ = tx.send(stage);
      })
    });
    RenderJob {
      clip,
      handle,
      progress: rx,
    }
  }

  pub fn clip(&self) -> &Clip {
    &self.clip
  }

  /// Progress reported since the last poll.
  pub fn poll(&self) -> Vec<Stage> {
    self.progress.try_iter().collect()
  }

  pub fn is_finished(&self) -> bool {
    self.handle.is_finished()
  }

  /// Waits for the worker and returns what it produced.
  pub fn join(self) -> Result<Artifacts> {
    self.handle.join().map_err(|_| Error::WorkerPanicked)?
  }

  /// Runs `during` on the calling thread while the worker renders, then
  /// joins the worker whether or not `during` succeeded.
  pub fn run_alongside<T>(
    self,
    during: impl FnOnce() -> Result<T>,
  ) -> (Result<T>, Result<Artifacts>) {
    let res = during();
    (res, self.join())
  }
}
