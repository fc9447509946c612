// Purpose: category volume and mute state, and how it reaches each voice
// This layer owns no voices; the engine hands it the active ones to rescale

pub mod category;
pub mod volume;

pub use category::{Category, UnknownCategory};
pub use volume::{CategoryMixer, VoiceMix};
