use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// A selectable audio clip and the text shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
  pub path: PathBuf,
  pub label: String,
}

impl Clip {
  pub fn new(path: PathBuf, label: impl Into<String>) -> Clip {
    let label = label.into();
    let label = if label.trim().is_empty() {
      file_name(&path).to_string()
    } else {
      label
    };
    Clip { path, label }
  }

  pub fn file_name(&self) -> &str {
    file_name(&self.path)
  }

  /// File name without extension, used to name rendered outputs.
  pub fn stem(&self) -> &str {
    self
      .path
      .file_stem()
      .and_then(|s| s.to_str())
      .unwrap_or("clip")
  }
}

fn file_name(path: &Path) -> &str {
  path.file_name().and_then(|s| s.to_str()).unwrap_or("")
}

pub fn has_supported_extension(path: &Path) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| {
      crate::SUPPORTED_FORMATS
        .iter()
        .any(|ext| e.eq_ignore_ascii_case(ext))
    })
    .unwrap_or(false)
}

/// Lists the playable clips in `dir`, sorted by file name.
pub fn list_clips(dir: &Path) -> Result<Vec<PathBuf>> {
  let entries = dir.read_dir().map_err(|e| Error::io(dir, e))?;
  let mut clips = entries
    .filter_map(|e| e.ok())
    .map(|e| e.path())
    .filter(|p| p.is_file() && has_supported_extension(p))
    .collect::<Vec<PathBuf>>();
  clips.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
  Ok(clips)
}

/// Builds the display text for one transcript row: the first two
/// non-empty columns joined by `": "`.
pub fn label_for(record: &StringRecord) -> String {
  record
    .iter()
    .map(str::trim)
    .filter(|f| !f.is_empty())
    .take(2)
    .collect::<Vec<&str>>()
    .join(": ")
}

/// Reads one label per data row of the transcript table.
pub fn load_transcript(path: &Path) -> Result<Vec<String>> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .trim(csv::Trim::All)
    .from_path(path)
    .map_err(|source| Error::Transcript {
      path: path.to_path_buf(),
      source,
    })?;
  let mut labels = vec![];
  for record in reader.records() {
    let record = record.map_err(|source| Error::Transcript {
      path: path.to_path_buf(),
      source,
    })?;
    labels.push(label_for(&record));
  }
  Ok(labels)
}

/// Pairs the clips in `clips_dir` with the transcript rows by position.
pub fn load_catalog(clips_dir: &Path, transcript: &Path) -> Result<Vec<Clip>> {
  let paths = list_clips(clips_dir)?;
  if paths.is_empty() {
    return Err(Error::NoClips(clips_dir.to_path_buf()));
  }

  let found = transcript.is_file();
  let labels = if found {
    load_transcript(transcript)?
  } else {
    warn!(
      "transcript table {} not found, labeling clips by file name",
      transcript.display()
    );
    vec![]
  };
  if counts_mismatch(found, paths.len(), labels.len()) {
    warn!(
      clips = paths.len(),
      labels = labels.len(),
      "transcript row count does not match clip count"
    );
  }

  let mut labels = labels.into_iter();
  let clips = paths
    .into_iter()
    .map(|path| Clip::new(path, labels.next().unwrap_or_default()))
    .collect::<Vec<Clip>>();
  debug!("loaded {} clips from {}", clips.len(), clips_dir.display());
  Ok(clips)
}

/// A transcript that was read must have exactly one row per clip.
fn counts_mismatch(transcript_found: bool, clips: usize, labels: usize) -> bool {
  transcript_found && clips != labels
}

/// The labels of `clips`, in catalog order.
pub fn to_clip_labels(clips: &[Clip]) -> Vec<&str> {
  clips.iter().map(|c| c.label.as_str()).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn label_joins_first_two_columns() {
    let record = StringRecord::from(vec!["alice", "hello there", "extra"]);
    assert_eq!(label_for(&record), "alice: hello there");
  }

  #[test]
  fn label_with_single_column() {
    let record = StringRecord::from(vec!["only text"]);
    assert_eq!(label_for(&record), "only text");
  }

  #[test]
  fn label_skips_blank_columns() {
    let record = StringRecord::from(vec!["", " bob ", "hi"]);
    assert_eq!(label_for(&record), "bob: hi");
  }

  #[test]
  fn empty_label_falls_back_to_file_name() {
    let clip = Clip::new(PathBuf::from("clips/a_01.wav"), "  ");
    assert_eq!(clip.label, "a_01.wav");
    assert_eq!(clip.stem(), "a_01");
  }

  #[test]
  fn header_only_transcript_is_a_mismatch() {
    assert!(counts_mismatch(true, 3, 0));
    assert!(counts_mismatch(true, 2, 5));
    assert!(!counts_mismatch(true, 2, 2));
    // already reported as missing
    assert!(!counts_mismatch(false, 3, 0));
  }

  #[test]
  fn extension_check_ignores_case() {
    assert!(has_supported_extension(Path::new("x/CLIP.WAV")));
    assert!(has_supported_extension(Path::new("clip.mp3")));
    assert!(!has_supported_extension(Path::new("notes.txt")));
    assert!(!has_supported_extension(Path::new("README")));
  }
}
