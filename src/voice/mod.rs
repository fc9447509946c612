// Purpose: the host playback capability and the handles used to address it
// The core never renders audio; it drives voices supplied by a host backend

pub mod factory;
pub mod sim;

use std::fmt;

pub use factory::VoiceFactory;
pub use sim::{SimClip, SimVoice};

/// World-space position forwarded to spatial voices. The core never reads it.
pub type Position = [f32; 3];

/// One playback unit supplied by the host audio backend.
///
/// A voice holds at most one clip at a time. The core sets its volume, loop
/// flag and spatial parameters, starts and stops it, and polls `is_playing`
/// once per tick to detect completion.
pub trait Voice {
    type Clip;

    fn set_clip(&mut self, clip: Option<Self::Clip>);
    fn set_looping(&mut self, looping: bool);

    /// Current output volume (0.0 - 1.0).
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn set_pitch(&mut self, pitch: f32);

    /// 0.0 = 2D, 1.0 = fully spatialised.
    fn set_spatial_blend(&mut self, blend: f32);
    fn set_position(&mut self, position: Position);

    fn play(&mut self);
    fn stop(&mut self);
    fn pause(&mut self);
    fn unpause(&mut self);

    /// False while paused, stopped, or after a non-looping clip ends.
    fn is_playing(&self) -> bool;

    /// False once the host has destroyed the underlying resource.
    ///
    /// Default implementation assumes voices live as long as the pool.
    fn is_valid(&self) -> bool {
        true
    }

    /// Return to the neutral state a pooled voice is handed out in.
    fn reset(&mut self) {
        self.stop();
        self.set_clip(None);
        self.set_looping(false);
        self.set_volume(1.0);
        self.set_pitch(1.0);
        self.set_spatial_blend(0.0);
        self.set_position([0.0; 3]);
    }
}

/// Generational reference to a pooled voice.
///
/// The generation changes whenever the slot goes back to the pool or is
/// recycled, so a handle held past that point no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceHandle {
    index: u32,
    generation: u32,
}

impl VoiceHandle {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Pool slot this handle points at. Stable across reuse of the same voice.
    pub const fn index(&self) -> usize {
        self.index as usize
    }

    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for VoiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice#{}.{}", self.index, self.generation)
    }
}
