mod common;

use clipscope::clips::{list_clips, load_catalog, load_transcript};
use clipscope::Error;
use common::{make_temp_dir, write_tone, write_transcript};

#[test]
fn clips_are_sorted_and_filtered() {
  let dir = make_temp_dir("catalog_list");
  write_tone(&dir.join("b.wav"), 8000, 1, 440.0, 80);
  write_tone(&dir.join("a.wav"), 8000, 1, 440.0, 80);
  std::fs::write(dir.join("notes.txt"), "not audio").unwrap();
  std::fs::create_dir(dir.join("sub.wav")).unwrap();

  let clips = list_clips(&dir).unwrap();
  let names = clips
    .iter()
    .map(|p| p.file_name().unwrap().to_str().unwrap())
    .collect::<Vec<&str>>();
  assert_eq!(names, vec!["a.wav", "b.wav"]);
  std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn labels_pair_with_clips_by_position() {
  let dir = make_temp_dir("catalog_pair");
  let clips_dir = dir.join("clips");
  std::fs::create_dir(&clips_dir).unwrap();
  write_tone(&clips_dir.join("01.wav"), 8000, 1, 440.0, 80);
  write_tone(&clips_dir.join("02.wav"), 8000, 1, 440.0, 80);
  let transcript = dir.join("transc.csv");
  write_transcript(&transcript, &[("alice", "hello, world"), ("bob", "second line")]);

  let catalog = load_catalog(&clips_dir, &transcript).unwrap();
  assert_eq!(catalog.len(), 2);
  assert_eq!(catalog[0].file_name(), "01.wav");
  assert_eq!(catalog[0].label, "alice: hello, world");
  assert_eq!(catalog[1].file_name(), "02.wav");
  assert_eq!(catalog[1].label, "bob: second line");
  std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn short_transcript_falls_back_to_file_names() {
  let dir = make_temp_dir("catalog_short");
  let clips_dir = dir.join("clips");
  std::fs::create_dir(&clips_dir).unwrap();
  for name in ["a.wav", "b.wav", "c.wav"] {
    write_tone(&clips_dir.join(name), 8000, 1, 440.0, 80);
  }
  let transcript = dir.join("transc.csv");
  write_transcript(&transcript, &[("alice", "one")]);

  let catalog = load_catalog(&clips_dir, &transcript).unwrap();
  let labels = catalog.iter().map(|c| c.label.as_str()).collect::<Vec<&str>>();
  assert_eq!(labels, vec!["alice: one", "b.wav", "c.wav"]);
  std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn extra_transcript_rows_are_ignored() {
  let dir = make_temp_dir("catalog_extra");
  let clips_dir = dir.join("clips");
  std::fs::create_dir(&clips_dir).unwrap();
  write_tone(&clips_dir.join("a.wav"), 8000, 1, 440.0, 80);
  let transcript = dir.join("transc.csv");
  write_transcript(&transcript, &[("alice", "one"), ("bob", "two"), ("carol", "three")]);

  let catalog = load_catalog(&clips_dir, &transcript).unwrap();
  assert_eq!(catalog.len(), 1);
  assert_eq!(catalog[0].label, "alice: one");
  std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn header_only_transcript_labels_by_file_name() {
  let dir = make_temp_dir("catalog_header_only");
  let clips_dir = dir.join("clips");
  std::fs::create_dir(&clips_dir).unwrap();
  write_tone(&clips_dir.join("a.wav"), 8000, 1, 440.0, 80);
  let transcript = dir.join("transc.csv");
  write_transcript(&transcript, &[]);

  let catalog = load_catalog(&clips_dir, &transcript).unwrap();
  assert_eq!(catalog[0].label, "a.wav");
  std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_transcript_labels_by_file_name() {
  let dir = make_temp_dir("catalog_missing");
  write_tone(&dir.join("only.wav"), 8000, 1, 440.0, 80);

  let catalog = load_catalog(&dir, &dir.join("absent.csv")).unwrap();
  assert_eq!(catalog.len(), 1);
  assert_eq!(catalog[0].label, "only.wav");
  std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn empty_directory_is_an_error() {
  let dir = make_temp_dir("catalog_empty");
  let err = load_catalog(&dir, &dir.join("transc.csv")).unwrap_err();
  assert!(matches!(err, Error::NoClips(_)));
  std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_clips_directory_is_an_error() {
  let dir = make_temp_dir("catalog_nodir");
  let err = load_catalog(&dir.join("nope"), &dir.join("transc.csv")).unwrap_err();
  assert!(matches!(err, Error::Io { .. }));
  std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn ragged_rows_are_accepted() {
  let dir = make_temp_dir("catalog_ragged");
  let transcript = dir.join("transc.csv");
  std::fs::write(&transcript, "speaker,text,extra\nalice\nbob,hi,x,y\n").unwrap();
  let labels = load_transcript(&transcript).unwrap();
  assert_eq!(labels, vec!["alice", "bob: hi"]);
  std::fs::remove_dir_all(&dir).unwrap();
}
