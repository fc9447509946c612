// Purpose - external interfaces the core consumes from its host

pub mod clips;
pub mod store;

pub use clips::ClipLibrary;
pub use store::{KeyValueStore, MemoryStore, StoredValue};

#[cfg(feature = "serde")]
pub use store::JsonFileStore;
