// Purpose: the playback coordinator and the state it keeps per active voice
// Single-threaded; other threads reach it through queued AudioMessages

pub mod active;
pub mod coordinator;
pub mod message;

pub use active::{ActiveSources, ActiveVoice};
pub use coordinator::PlaybackCoordinator;
pub use message::{AudioMessage, MessageReceiver};
