//! Headless voice backend.
//!
//! `SimVoice` produces no audio. It tracks a playback cursor over a clip of
//! known length and advances it when the host calls [`SimVoice::advance`],
//! which is enough to drive the pool, mixer and fades without a device.

use super::{Position, Voice};

/// A clip described only by its name and length in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SimClip {
    pub name: String,
    pub length: f32,
}

impl SimClip {
    pub fn new(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            length: length.max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone)]
pub struct SimVoice {
    clip: Option<SimClip>,
    looping: bool,
    volume: f32,
    pitch: f32,
    spatial_blend: f32,
    position: Position,
    cursor: f32,
    state: SimState,
    valid: bool,
}

impl SimVoice {
    pub fn new() -> Self {
        Self {
            clip: None,
            looping: false,
            volume: 1.0,
            pitch: 1.0,
            spatial_blend: 0.0,
            position: [0.0; 3],
            cursor: 0.0,
            state: SimState::Stopped,
            valid: true,
        }
    }

    /// Move the playback cursor forward by `dt` seconds (scaled by pitch).
    ///
    /// Non-looping clips stop when the cursor reaches the clip length;
    /// looping clips wrap.
    pub fn advance(&mut self, dt: f32) {
        if self.state != SimState::Playing {
            return;
        }
        let Some(length) = self.clip.as_ref().map(|c| c.length) else {
            self.state = SimState::Stopped;
            return;
        };

        self.cursor += dt * self.pitch;
        if self.cursor >= length {
            if self.looping && length > 0.0 {
                self.cursor %= length;
            } else {
                self.cursor = 0.0;
                self.state = SimState::Stopped;
            }
        }
    }

    /// End playback as if the clip ran out.
    pub fn finish(&mut self) {
        self.cursor = 0.0;
        self.state = SimState::Stopped;
    }

    /// Simulate the host tearing the voice down (e.g. a scene unload).
    pub fn destroy(&mut self) {
        self.valid = false;
        self.state = SimState::Stopped;
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == SimState::Paused
    }

    pub fn clip(&self) -> Option<&SimClip> {
        self.clip.as_ref()
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn spatial_blend(&self) -> f32 {
        self.spatial_blend
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }
}

impl Default for SimVoice {
    fn default() -> Self {
        Self::new()
    }
}

impl Voice for SimVoice {
    type Clip = SimClip;

    fn set_clip(&mut self, clip: Option<SimClip>) {
        self.clip = clip;
        self.cursor = 0.0;
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
    }

    fn set_spatial_blend(&mut self, blend: f32) {
        self.spatial_blend = blend.clamp(0.0, 1.0);
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn play(&mut self) {
        if self.valid && self.clip.is_some() {
            self.cursor = 0.0;
            self.state = SimState::Playing;
        }
    }

    fn stop(&mut self) {
        self.cursor = 0.0;
        self.state = SimState::Stopped;
    }

    fn pause(&mut self) {
        if self.state == SimState::Playing {
            self.state = SimState::Paused;
        }
    }

    fn unpause(&mut self) {
        if self.state == SimState::Paused {
            self.state = SimState::Playing;
        }
    }

    fn is_playing(&self) -> bool {
        self.state == SimState::Playing
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}
