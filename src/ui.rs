use std::{collections::hash_map::DefaultHasher, hash::Hasher};

use tui::{
  backend::Backend,
  layout::{Constraint, Direction, Layout},
  style::{Color, Modifier, Style},
  widgets::{BarChart, Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
  Frame,
};

const CONTROLS: &str =
  "enter: play + render\np: play/pause\nr: replay\nv: render only\nx: random clip\n/: search\nq: quit";

/// The main UI that the user sees.
pub fn main_ui<B: Backend>(
  f: &mut Frame<B>,
  clips: &[&str],
  list_state: &mut ListState,
  spectrum: &[f32],
  now_playing: Option<&str>,
  status: &str,
  ui_color: Color,
) {
  let data = spectrum_data(spectrum);

  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .margin(0)
    .constraints([Constraint::Min(12), Constraint::Percentage(60)].as_ref())
    .split(f.size());

  let visualizer_chunk = Layout::default()
    .direction(Direction::Horizontal)
    .margin(1)
    .constraints(
      [
        Constraint::Min((crate::NUM_BARS * 2) as u16),
        Constraint::Percentage(40),
      ]
      .as_ref(),
    )
    .split(chunks[0]);

  f.render_widget(spectrum_visualizer(&data, ui_color), visualizer_chunk[0]);
  f.render_widget(
    now_playing_panel(now_playing, status, ui_color),
    visualizer_chunk[1],
  );
  f.render_stateful_widget(clip_list(clips, ui_color), chunks[1], list_state);
}

/// Scales band magnitudes into bar chart heights.
pub fn spectrum_data(spectrum: &[f32]) -> Vec<(&'static str, u64)> {
  spectrum
    .iter()
    .map(|v| ("", (v * 1000.0) as u64 + 10))
    .collect()
}

/// Displays the spectrum visualizer for the currently playing clip.
fn spectrum_visualizer<'a>(data: &'a [(&str, u64)], ui_color: Color) -> BarChart<'a> {
  BarChart::default()
    .block(Block::default().title("clipscope").borders(Borders::ALL))
    .style(Style::default().fg(ui_color))
    .data(data)
    .bar_width(2)
    .bar_gap(0)
    .bar_style(Style::default().fg(ui_color))
}

/// Displays the playing clip, render status and controls.
fn now_playing_panel(now_playing: Option<&str>, status: &str, ui_color: Color) -> Paragraph<'static> {
  let label = now_playing.unwrap_or("nothing playing");
  Paragraph::new(format!("{label}\n\n{status}\n\n{CONTROLS}"))
    .block(Block::default().title("now-playing").borders(Borders::ALL))
    .style(Style::default().fg(ui_color))
    .wrap(Wrap { trim: true })
}

/// The clip selector.
fn clip_list<'a>(clips: &'a [&str], ui_color: Color) -> List<'a> {
  List::new(
    clips
      .iter()
      .map(|s| ListItem::new(*s))
      .collect::<Vec<ListItem>>(),
  )
  .block(Block::default().title("clips").borders(Borders::ALL))
  .style(Style::default().fg(ui_color))
  .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
  .highlight_symbol("> ")
}

/// Gets the color of the UI.
/// Yellow by default, or a color derived from the hash of the clip name.
pub fn get_ui_color(clip_name: &str, from_name: bool) -> Color {
  if from_name {
    let mut s = DefaultHasher::new();
    s.write(clip_name.as_bytes());
    Color::Indexed((s.finish() % 15) as u8 + 1)
  } else {
    Color::Yellow
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_color_is_yellow() {
    assert_eq!(get_ui_color("a.wav", false), Color::Yellow);
  }

  #[test]
  fn name_color_is_stable_and_not_black() {
    let c = get_ui_color("a.wav", true);
    assert_eq!(c, get_ui_color("a.wav", true));
    match c {
      Color::Indexed(i) => assert!((1..=15).contains(&i)),
      other => panic!("unexpected color {:?}", other),
    }
  }

  #[test]
  fn spectrum_bars_have_a_floor() {
    assert_eq!(spectrum_data(&[0.0, 0.5]), vec![("", 10), ("", 510)]);
  }
}
