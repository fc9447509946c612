//! Software voices mixed inside the cpal callback
//!
//! The update loop drives voices through the `Voice` trait; the audio
//! callback only reads their state and advances playback cursors.

use std::{
    f32::consts::FRAC_PI_4,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use saavy_mixer::voice::{Position, Voice};

use super::clips::ToneClip;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transport {
    Stopped,
    Playing,
    Paused,
}

struct VoiceState {
    clip: Option<ToneClip>,
    looping: bool,
    volume: f32,
    pitch: f32,
    spatial_blend: f32,
    position: Position,
    cursor: f64, // fractional frame into the clip
    transport: Transport,
    alive: bool, // false once the owning SoftVoice is dropped
}

impl VoiceState {
    fn new() -> Self {
        Self {
            clip: None,
            looping: false,
            volume: 1.0,
            pitch: 1.0,
            spatial_blend: 0.0,
            position: [0.0; 3],
            cursor: 0.0,
            transport: Transport::Stopped,
            alive: true,
        }
    }

    // Equal-power pan from the x coordinate, scaled by spatial blend
    fn pan_gains(&self) -> (f32, f32) {
        let pan = self.position[0].clamp(-1.0, 1.0) * self.spatial_blend;
        let angle = (pan + 1.0) * FRAC_PI_4;
        (angle.cos(), angle.sin())
    }

    fn render_into(&mut self, out: &mut [f32], channels: usize, sample_rate: f32) {
        let (left, right) = self.pan_gains();
        let Some(clip) = self.clip.as_ref() else {
            self.transport = Transport::Stopped;
            return;
        };
        let samples = clip.samples();
        let len = samples.len();
        if len == 0 {
            self.transport = Transport::Stopped;
            return;
        }

        let step = f64::from(self.pitch * clip.sample_rate() / sample_rate);
        for frame in out.chunks_mut(channels) {
            if self.cursor >= len as f64 {
                if !self.looping {
                    self.cursor = 0.0;
                    self.transport = Transport::Stopped;
                    break;
                }
                self.cursor %= len as f64;
            }

            let sample = samples[(self.cursor as usize).min(len - 1)] * self.volume;
            match frame {
                [l, r, ..] => {
                    *l += sample * left;
                    *r += sample * right;
                }
                [mono] => *mono += sample,
                [] => {}
            }
            self.cursor += step;
        }
    }
}

/// Voice table shared by the update loop and the audio callback.
#[derive(Clone, Default)]
pub struct VoiceBus {
    states: Arc<Mutex<Vec<VoiceState>>>,
}

impl VoiceBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a table slot for a new voice, reusing dropped ones.
    pub fn create_voice(&self) -> SoftVoice {
        let mut states = self.lock();
        let slot = match states.iter().position(|state| !state.alive) {
            Some(slot) => {
                states[slot] = VoiceState::new();
                slot
            }
            None => {
                states.push(VoiceState::new());
                states.len() - 1
            }
        };
        SoftVoice {
            bus: self.clone(),
            slot,
        }
    }

    /// Mix every playing voice into interleaved `out`.
    pub fn render(&self, out: &mut [f32], channels: usize, sample_rate: f32) {
        out.fill(0.0);
        let channels = channels.max(1);

        let mut states = self.lock();
        for state in states
            .iter_mut()
            .filter(|state| state.alive && state.transport == Transport::Playing)
        {
            state.render_into(out, channels, sample_rate);
        }
        drop(states);

        for sample in out.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }

    // A panic on the other side leaves plain data behind; keep using it
    fn lock(&self) -> MutexGuard<'_, Vec<VoiceState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Host voice handed to the pool. Dropping it frees its table slot.
pub struct SoftVoice {
    bus: VoiceBus,
    slot: usize,
}

impl SoftVoice {
    fn with<R>(&self, f: impl FnOnce(&mut VoiceState) -> R) -> Option<R> {
        let mut states = self.bus.lock();
        states.get_mut(self.slot).map(f)
    }
}

impl Voice for SoftVoice {
    type Clip = ToneClip;

    fn set_clip(&mut self, clip: Option<ToneClip>) {
        self.with(|state| {
            state.clip = clip;
            state.cursor = 0.0;
        });
    }

    fn set_looping(&mut self, looping: bool) {
        self.with(|state| state.looping = looping);
    }

    fn volume(&self) -> f32 {
        self.with(|state| state.volume).unwrap_or(0.0)
    }

    fn set_volume(&mut self, volume: f32) {
        self.with(|state| state.volume = volume.clamp(0.0, 1.0));
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.with(|state| state.pitch = pitch.max(0.0));
    }

    fn set_spatial_blend(&mut self, blend: f32) {
        self.with(|state| state.spatial_blend = blend.clamp(0.0, 1.0));
    }

    fn set_position(&mut self, position: Position) {
        self.with(|state| state.position = position);
    }

    fn play(&mut self) {
        self.with(|state| {
            if state.clip.is_some() {
                state.cursor = 0.0;
                state.transport = Transport::Playing;
            }
        });
    }

    fn stop(&mut self) {
        self.with(|state| {
            state.cursor = 0.0;
            state.transport = Transport::Stopped;
        });
    }

    fn pause(&mut self) {
        self.with(|state| {
            if state.transport == Transport::Playing {
                state.transport = Transport::Paused;
            }
        });
    }

    fn unpause(&mut self) {
        self.with(|state| {
            if state.transport == Transport::Paused {
                state.transport = Transport::Playing;
            }
        });
    }

    fn is_playing(&self) -> bool {
        self.with(|state| state.transport == Transport::Playing)
            .unwrap_or(false)
    }

    fn is_valid(&self) -> bool {
        self.with(|state| state.alive).unwrap_or(false)
    }
}

impl Drop for SoftVoice {
    fn drop(&mut self) {
        self.with(|state| {
            state.alive = false;
            state.transport = Transport::Stopped;
            state.clip = None;
        });
    }
}
