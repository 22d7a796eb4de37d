use crossterm::{
  event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
  execute,
  terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rodio::Sink;
use tracing::{info, warn};

use crate::audio::{open_source, Player};
use crate::clips::{to_clip_labels, Clip};
use crate::config::{Config, RenderKind};
use crate::pipeline::RenderJob;
use crate::spectrum::Analyzer;
use crate::ui::{get_ui_color, main_ui};
use std::{
  io::{self, Write},
  time::{Duration, Instant},
};
use tui::{
  backend::{Backend, CrosstermBackend},
  widgets::ListState,
  Terminal,
};

struct Playing {
  index: usize,
  sink: Sink,
  analyzer: Analyzer,
}

/// State of the clip browser.
pub struct App {
  clips: Vec<Clip>,
  config: Config,
  kind: RenderKind,
  list_state: ListState,
  player: Option<Player>,
  playing: Option<Playing>,
  job: Option<RenderJob>,
  status: String,
}

impl App {
  pub fn new(clips: Vec<Clip>, config: Config, kind: RenderKind, player: Option<Player>) -> App {
    let mut list_state = ListState::default();
    if !clips.is_empty() {
      list_state.select(Some(0));
    }
    let status = if player.is_some() {
      format!("{} clips loaded", clips.len())
    } else {
      "no audio output, rendering only".to_string()
    };
    App {
      clips,
      config,
      kind,
      list_state,
      player,
      playing: None,
      job: None,
      status,
    }
  }

  pub fn selected(&self) -> usize {
    self.list_state.selected().unwrap_or(0)
  }

  pub fn select(&mut self, index: usize) {
    if index < self.clips.len() {
      self.list_state.select(Some(index));
    }
  }

  pub fn select_next(&mut self) {
    if !self.clips.is_empty() {
      self.select((self.selected() + 1) % self.clips.len());
    }
  }

  pub fn select_previous(&mut self) {
    if !self.clips.is_empty() {
      self.select((self.selected() + self.clips.len() - 1) % self.clips.len());
    }
  }

  pub fn select_random(&mut self) {
    if !self.clips.is_empty() {
      self.select(fastrand::usize(..self.clips.len()));
    }
  }

  /// Plays the selected clip from the start, replacing whatever was playing.
  pub fn play_selected(&mut self) {
    let index = self.selected();
    let Some(clip) = self.clips.get(index) else {
      return;
    };
    let Some(player) = &self.player else {
      self.status = "no audio output available".to_string();
      return;
    };
    if let Some(old) = self.playing.take() {
      old.sink.stop();
    }
    let started = player
      .play(&clip.path)
      .and_then(|sink| Ok((sink, Analyzer::from_clip(open_source(&clip.path)?))));
    match started {
      Ok((sink, analyzer)) => {
        info!("playing {}", clip.file_name());
        self.playing = Some(Playing {
          index,
          sink,
          analyzer,
        });
      }
      Err(e) => {
        warn!("could not play {}: {}", clip.file_name(), e);
        self.status = format!("could not play clip: {}", e);
      }
    }
  }

  /// Starts rendering the selected clip unless a render is already running.
  pub fn start_render(&mut self, kind: RenderKind) {
    if let Some(job) = &self.job {
      self.status = format!("still rendering {}", job.clip().file_name());
      return;
    }
    let Some(clip) = self.clips.get(self.selected()) else {
      return;
    };
    self.status = format!("{}: queued", clip.file_name());
    self.job = Some(RenderJob::spawn(clip.clone(), self.config.clone(), kind));
  }

  /// Pauses or resumes playback; returns true if playback resumed.
  pub fn toggle_pause(&mut self) -> bool {
    match &self.playing {
      Some(p) if p.sink.is_paused() => {
        p.sink.play();
        true
      }
      Some(p) => {
        p.sink.pause();
        false
      }
      None => false,
    }
  }

  pub fn on_tick(&mut self, elapsed: u32) {
    if let Some(p) = &mut self.playing {
      if p.sink.empty() {
        self.playing = None;
      } else if !p.sink.is_paused() {
        p.analyzer.on_tick(elapsed);
      }
    }
    self.poll_job();
  }

  fn poll_job(&mut self) {
    let Some(job) = &self.job else {
      return;
    };
    if let Some(stage) = job.poll().last() {
      self.status = format!("{}: {}", job.clip().file_name(), stage);
    }
    if job.is_finished() {
      if let Some(job) = self.job.take() {
        let name = job.clip().file_name().to_string();
        self.status = match job.join() {
          Ok(artifacts) => {
            let written = [artifacts.spectrogram, artifacts.video]
              .into_iter()
              .flatten()
              .map(|p| p.display().to_string())
              .collect::<Vec<String>>();
            format!("{}: wrote {}", name, written.join(", "))
          }
          Err(e) => {
            warn!("render of {} failed: {}", name, e);
            format!("{}: render failed: {}", name, e)
          }
        };
      }
    }
  }

  /// Hands over a render that is still running.
  pub fn take_job(&mut self) -> Option<RenderJob> {
    self.job.take()
  }

  fn now_playing(&self) -> Option<&str> {
    self
      .playing
      .as_ref()
      .and_then(|p| self.clips.get(p.index))
      .map(|c| c.label.as_str())
  }

  fn ui_color(&self) -> tui::style::Color {
    let name = self
      .playing
      .as_ref()
      .and_then(|p| self.clips.get(p.index))
      .map(|c| c.file_name())
      .unwrap_or("");
    get_ui_color(name, self.config.color)
  }
}

/// Sets up the terminal, and runs the UI.
pub fn run(clips: Vec<Clip>, config: Config, kind: RenderKind) -> anyhow::Result<()> {
  let player = match Player::try_default() {
    Ok(p) => Some(p),
    Err(e) => {
      warn!("{}", e);
      None
    }
  };
  let mut app = App::new(clips, config, kind, player);

  // setup terminal
  enable_raw_mode()?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend)?;

  // run application
  let res = run_app(&mut terminal, &mut app);

  // restore terminal
  disable_raw_mode()?;
  execute!(
    terminal.backend_mut(),
    LeaveAlternateScreen,
    DisableMouseCapture
  )?;
  terminal.show_cursor()?;

  if let Some(job) = app.take_job() {
    println!("waiting for {} to finish rendering...", job.clip().file_name());
    match job.join() {
      Ok(artifacts) => info!("render finished: {:?}", artifacts),
      Err(e) => println!("render failed: {}", e),
    }
  }

  res
}

/// Runs the UI loop, assuming the terminal has been prepared.
fn run_app<B: Backend + Write>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
  let tick_rate = Duration::from_millis(crate::TICK_RATE);
  let mut last_tick = Instant::now();

  loop {
    let ui_color = app.ui_color();
    let now_playing = app.now_playing().map(str::to_string);
    let spectrum = app
      .playing
      .as_ref()
      .map(|p| p.analyzer.spectrum().to_vec())
      .unwrap_or_default();
    let labels = to_clip_labels(&app.clips);
    let list_state = &mut app.list_state;
    let status = &app.status;
    terminal.draw(|f| {
      main_ui(
        f,
        &labels,
        list_state,
        &spectrum,
        now_playing.as_deref(),
        status,
        ui_color,
      )
    })?;

    let timeout = tick_rate
      .checked_sub(last_tick.elapsed())
      .unwrap_or_else(|| Duration::from_secs(0));

    if crossterm::event::poll(timeout)? {
      if let Event::Key(key) = event::read()? {
        match key.code {
          KeyCode::Char('q') => return Ok(()),
          KeyCode::Down | KeyCode::Char('j') => app.select_next(),
          KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
          KeyCode::Enter => {
            app.play_selected();
            app.start_render(app.kind);
            last_tick = Instant::now();
          }
          KeyCode::Char('p') => {
            if app.toggle_pause() {
              last_tick = Instant::now();
            }
          }
          KeyCode::Char('r') => {
            app.play_selected();
            last_tick = Instant::now();
          }
          KeyCode::Char('v') => app.start_render(app.kind),
          KeyCode::Char('x') => app.select_random(),
          KeyCode::Char('/') => {
            let picked = {
              let labels = to_clip_labels(&app.clips);
              suspend(terminal)?;
              let picked = crate::search::pick_clip(&labels);
              resume(terminal)?;
              picked?
            };
            if let Some(index) = picked {
              app.select(index);
            }
          }
          _ => (),
        }
      }
    }

    if last_tick.elapsed() >= tick_rate {
      let elapsed = last_tick.elapsed().as_millis();
      last_tick = Instant::now();
      app.on_tick(elapsed as u32);
    }
  }
}

/// Gives the terminal back to the shell while another program uses it.
fn suspend<B: Backend + Write>(terminal: &mut Terminal<B>) -> io::Result<()> {
  disable_raw_mode()?;
  execute!(
    terminal.backend_mut(),
    LeaveAlternateScreen,
    DisableMouseCapture
  )
}

fn resume<B: Backend + Write>(terminal: &mut Terminal<B>) -> io::Result<()> {
  enable_raw_mode()?;
  execute!(
    terminal.backend_mut(),
    EnterAlternateScreen,
    EnableMouseCapture
  )?;
  terminal.clear()
}
