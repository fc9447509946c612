//! TUI module for saavy-mixer
//!
//! The UI thread is the engine's update loop: each frame drains queued
//! control messages, ticks the coordinator and redraws.

mod mixer;
pub mod state;
mod transport;
mod waveform;

use std::{
    collections::{HashMap, VecDeque},
    time::{Duration, Instant},
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use tracing::info;

use saavy_mixer::{
    io::JsonFileStore, mixer::Category, AudioMessage, PlaybackCoordinator, VoiceFactory,
    VoiceHandle,
};

use super::{backend::SoftVoice, clips::ToneClip};
use mixer::render_mixer;
use state::MixerSnapshot;
use transport::{render_transport, AudioStats};
use waveform::render_waveform;

/// Samples kept for the scope and level meter
pub const VIS_BUFFER_SIZE: usize = 1024;

const VOLUME_STEP: f32 = 0.05;
const THEMES: [&str; 2] = ["theme", "night"];

pub struct UiApp<F: VoiceFactory<Voice = SoftVoice>> {
    coordinator: PlaybackCoordinator<F, JsonFileStore>,
    clips: HashMap<String, ToneClip>,
    /// Mixed output from the audio callback
    audio_rx: Consumer<f32>,
    audio_buffer: Vec<f32>,
    /// Key presses become messages, applied at the top of the next frame
    messages: VecDeque<AudioMessage>,
    selected: Category,
    music: Option<VoiceHandle>,
    theme: usize,
    pan_right: bool,
    sample_rate: f32,
    should_quit: bool,
}

impl<F: VoiceFactory<Voice = SoftVoice>> UiApp<F> {
    pub fn new(
        coordinator: PlaybackCoordinator<F, JsonFileStore>,
        clips: HashMap<String, ToneClip>,
        audio_rx: Consumer<f32>,
        sample_rate: f32,
    ) -> Self {
        Self {
            coordinator,
            clips,
            audio_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            messages: VecDeque::new(),
            selected: Category::Sfx,
            music: None,
            theme: 0,
            pan_right: false,
            sample_rate,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        let mut last_frame = Instant::now();

        while !self.should_quit {
            self.poll_audio();

            let now = Instant::now();
            let dt = now.duration_since(last_frame).as_secs_f32();
            last_frame = now;
            self.coordinator.process_messages(&mut self.messages);
            self.coordinator.tick(dt);

            let snapshot = MixerSnapshot::capture(&self.coordinator, self.selected);
            terminal.draw(|frame| self.render(frame, &snapshot))?;

            // Non-blocking, ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Stop all audio and release pooled voices.
    pub fn shutdown(&mut self) {
        self.coordinator.shutdown();
    }

    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }
        if received && self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let category = self.selected;
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(c @ '1'..='6') => {
                let index = c as usize - '1' as usize;
                self.selected = Category::ALL[index];
            }
            KeyCode::Up => self.select_offset(Category::COUNT - 1),
            KeyCode::Down => self.select_offset(1),
            KeyCode::Left | KeyCode::Right => {
                let step = if key == KeyCode::Left { -VOLUME_STEP } else { VOLUME_STEP };
                let volume = self.coordinator.mixer().stored_volume(category) + step;
                self.messages.push_back(AudioMessage::SetCategoryVolume {
                    category,
                    volume: volume.clamp(0.0, 1.0),
                });
            }
            KeyCode::Char('m') => {
                let muted = !self.coordinator.is_category_muted(category);
                self.messages
                    .push_back(AudioMessage::SetCategoryMute { category, muted });
            }
            KeyCode::Char(' ') => {
                let (name, looping) = clip_for(category);
                self.coordinator
                    .play_named(&self.clips, name, category, looping, 1.0);
            }
            KeyCode::Char('a') => self.play_panned(),
            KeyCode::Char('f') => {
                let (name, _) = clip_for(category);
                if let Some(clip) = self.clips.get(name).cloned() {
                    self.coordinator.play_with_fade_in(clip, category, None);
                }
            }
            KeyCode::Char('x') => self.swap_music(),
            KeyCode::Char('o') => {
                for handle in self.coordinator.active_handles(category) {
                    self.messages.push_back(AudioMessage::FadeOut {
                        handle,
                        duration: None,
                    });
                }
            }
            KeyCode::Char('p') => self.messages.push_back(AudioMessage::PauseCategory(category)),
            KeyCode::Char('r') => self.messages.push_back(AudioMessage::ResumeCategory(category)),
            KeyCode::Char('s') => self.messages.push_back(AudioMessage::StopCategory(category)),
            KeyCode::Char('S') => self.messages.push_back(AudioMessage::StopAll),
            _ => {}
        }
    }

    fn select_offset(&mut self, offset: usize) {
        let index = (self.selected.index() + offset) % Category::COUNT;
        self.selected = Category::ALL[index];
    }

    // Alternate hard left and hard right
    fn play_panned(&mut self) {
        let Some(clip) = self.clips.get("blip").cloned() else {
            return;
        };
        let x = if self.pan_right { 1.0 } else { -1.0 };
        self.pan_right = !self.pan_right;
        self.coordinator
            .play_at_position(clip, [x, 0.0, 0.0], Category::Sfx, 1.0);
    }

    // Cross-fade between the two looping themes, or start the first one
    fn swap_music(&mut self) {
        let current = self.music.filter(|&h| self.coordinator.is_active(h));
        let Some(clip) = self.clips.get(THEMES[self.theme]).cloned() else {
            return;
        };

        self.music = match current {
            Some(outgoing) => {
                self.coordinator
                    .cross_fade_to(outgoing, clip, Category::Music, true, None)
            }
            None => self.coordinator.play(clip, Category::Music, true, 1.0),
        };
        info!(theme = THEMES[self.theme], started = self.music.is_some(), "music changed");
        self.theme = (self.theme + 1) % THEMES.len();
    }

    fn render(&self, frame: &mut Frame, snapshot: &MixerSnapshot) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Length(Category::COUNT as u16 + 2),
                Constraint::Min(6),    // Scope
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_transport(frame, chunks[0], snapshot, &stats, self.sample_rate);
        render_mixer(frame, chunks[1], snapshot);

        let master = &snapshot.rows[Category::Master.index()];
        render_waveform(frame, chunks[2], &self.audio_buffer, master.gain == 0.0);

        let help = Paragraph::new(
            " [1-6] Category  [←→] Volume  [M] Mute  [Space] Play  [A] Pan  [F] Fade in  \
             [O] Fade out  [X] Music  [P/R] Pause/Resume  [S] Stop  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}

fn clip_for(category: Category) -> (&'static str, bool) {
    match category {
        Category::Master | Category::Sfx => ("blip", false),
        Category::Ui => ("click", false),
        Category::Voice => ("line", false),
        Category::Music => ("theme", true),
        Category::Ambient => ("rain", true),
    }
}
