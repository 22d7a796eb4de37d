use anyhow::anyhow;
use std::io::Cursor;

use skim::prelude::*;

pub fn run_search(options: &SkimOptions, reader: SkimItemReader, input: String) -> Vec<String> {
  let items = reader.of_bufread(Cursor::new(input));
  let selected_items = Skim::run_with(options, Some(items))
    .filter(|out| !out.is_abort)
    .map(|out| out.selected_items)
    .unwrap_or_else(Vec::new);

  selected_items
    .iter()
    .map(|s| s.text().to_string())
    .collect::<Vec<String>>()
}

/// One line per clip, prefixed with its catalog index.
pub fn search_lines(labels: &[&str]) -> String {
  labels
    .iter()
    .enumerate()
    .map(|(i, label)| format!("{} {}", i, label.replace('\n', " ")))
    .collect::<Vec<String>>()
    .join("\n")
}

pub fn parse_index(line: &str) -> Option<usize> {
  line.split_whitespace().next()?.parse().ok()
}

/// Lets the user fuzzy-find a clip by its label. `None` if the search was
/// aborted or nothing matched.
pub fn pick_clip(labels: &[&str]) -> anyhow::Result<Option<usize>> {
  let options = SkimOptionsBuilder::default()
    .height(Some("50%"))
    .multi(false)
    .prompt(Some("clip> "))
    .build()
    .map_err(|e| anyhow!("invalid search options: {}", e))?;
  let selected = run_search(&options, SkimItemReader::default(), search_lines(labels));
  Ok(
    selected
      .first()
      .and_then(|line| parse_index(line))
      .filter(|i| *i < labels.len()),
  )
}
