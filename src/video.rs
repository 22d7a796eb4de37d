//! Video assembly through the ffmpeg command-line tool.

use std::{
  ffi::OsString,
  path::{Path, PathBuf},
  process::Command,
};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::frames::FRAME_PATTERN;

pub struct Ffmpeg {
  program: PathBuf,
}

impl Ffmpeg {
  pub fn new(program: impl Into<PathBuf>) -> Ffmpeg {
    Ffmpeg {
      program: program.into(),
    }
  }

  fn tool_name(&self) -> String {
    self.program.display().to_string()
  }

  /// Check if ffmpeg can be run at all.
  pub fn is_available(&self) -> bool {
    Command::new(&self.program)
      .arg("-version")
      .output()
      .map(|o| o.status.success())
      .unwrap_or(false)
  }

  /// Arguments that encode the numbered frames in `frames_dir` into a silent video.
  pub fn encode_args(frames_dir: &Path, fps: u32, out: &Path) -> Vec<OsString> {
    let mut args = base_args();
    let tail: [OsString; 9] = [
      "-framerate".into(),
      fps.to_string().into(),
      "-i".into(),
      frames_dir.join(FRAME_PATTERN).into_os_string(),
      "-c:v".into(),
      "libx264".into(),
      "-pix_fmt".into(),
      "yuv420p".into(),
      out.as_os_str().to_owned(),
    ];
    args.extend(tail);
    args
  }

  /// Arguments that combine the video stream of `video` with the audio of `audio`.
  pub fn mux_args(video: &Path, audio: &Path, out: &Path) -> Vec<OsString> {
    let mut args = base_args();
    let tail: [OsString; 14] = [
      "-i".into(),
      video.as_os_str().to_owned(),
      "-i".into(),
      audio.as_os_str().to_owned(),
      "-map".into(),
      "0:v:0".into(),
      "-map".into(),
      "1:a:0".into(),
      "-c:v".into(),
      "copy".into(),
      "-c:a".into(),
      "aac".into(),
      "-shortest".into(),
      out.as_os_str().to_owned(),
    ];
    args.extend(tail);
    args
  }

  pub fn encode_frames(&self, frames_dir: &Path, fps: u32, out: &Path) -> Result<()> {
    self.run(&Ffmpeg::encode_args(frames_dir, fps, out))
  }

  pub fn mux(&self, video: &Path, audio: &Path, out: &Path) -> Result<()> {
    self.run(&Ffmpeg::mux_args(video, audio, out))
  }

  fn run(&self, args: &[OsString]) -> Result<()> {
    debug!("running {} {:?}", self.tool_name(), args);
    let output = Command::new(&self.program)
      .args(args)
      .output()
      .map_err(|source| Error::ToolSpawn {
        tool: self.tool_name(),
        source,
      })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(Error::ToolFailed {
        tool: self.tool_name(),
        status: output.status,
        stderr: stderr
          .lines()
          .rev()
          .find(|l| !l.trim().is_empty())
          .unwrap_or("unknown error")
          .to_string(),
      });
    }
    Ok(())
  }
}

fn base_args() -> Vec<OsString> {
  vec!["-y".into(), "-loglevel".into(), "error".into()]
}

/// Intermediate files of a render, removed when the guard is dropped.
pub struct TempArtifacts {
  paths: Vec<PathBuf>,
  keep: bool,
}

impl TempArtifacts {
  pub fn new(keep: bool) -> TempArtifacts {
    TempArtifacts { paths: vec![], keep }
  }

  pub fn track(&mut self, path: impl Into<PathBuf>) {
    self.paths.push(path.into());
  }

  pub fn paths(&self) -> &[PathBuf] {
    &self.paths
  }
}

impl Drop for TempArtifacts {
  fn drop(&mut self) {
    if self.keep {
      return;
    }
    for path in &self.paths {
      let res = if path.is_dir() {
        std::fs::remove_dir_all(path)
      } else if path.exists() {
        std::fs::remove_file(path)
      } else {
        continue;
      };
      if let Err(e) = res {
        warn!("could not remove {}: {}", path.display(), e);
      }
    }
  }
}
