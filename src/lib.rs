pub mod config; // Settings and their JSON form
pub mod engine; // Playback coordination
pub mod error;
pub mod fade;
pub mod io; // Host-side clip lookup and preference storage
pub mod mixer; // Category volume and mute
pub mod pool;
pub mod voice;

pub use config::AudioSettings;
pub use engine::{AudioMessage, PlaybackCoordinator};
pub use error::{ConfigError, PlayError, StoreError};
pub use mixer::Category;
pub use voice::{Voice, VoiceFactory, VoiceHandle};
