#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::{mixer::Category, voice::VoiceHandle};

/// Control requests queued from outside the update loop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AudioMessage {
    SetCategoryVolume { category: Category, volume: f32 },
    SetCategoryMute { category: Category, muted: bool },
    StopCategory(Category),
    PauseCategory(Category),
    ResumeCategory(Category),
    StopAll,
    Stop(VoiceHandle),
    /// `None` uses the configured default fade-out time.
    FadeOut { handle: VoiceHandle, duration: Option<f32> },
    /// Host backend reports that a voice ran out of material.
    VoiceFinished(VoiceHandle),
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<AudioMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<AudioMessage> {
    fn pop(&mut self) -> Option<AudioMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<AudioMessage> {
    fn pop(&mut self) -> Option<AudioMessage> {
        self.pop_front()
    }
}
