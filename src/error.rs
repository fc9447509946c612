//! Error types.
//!
//! Nothing here escalates past the public playback API: play calls absorb
//! [`PlayError`] into an empty result, and storage failures are logged while
//! the in-memory settings stay applied.

use std::path::PathBuf;

use thiserror::Error;

/// Why a play request did not produce a voice.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlayError {
    /// Requested volume was NaN or infinite.
    #[error("invalid playback volume {0}")]
    InvalidVolume(f32),

    /// Named clip could not be resolved by the clip library.
    #[error("audio clip '{0}' not found")]
    ClipNotFound(String),

    /// Every voice is busy and the pool is at capacity.
    #[error("no available voices (max: {max}), consider increasing pool size")]
    PoolExhausted { max: usize },
}

/// Durable key-value storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access settings store '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "serde")]
    #[error("malformed settings store '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Audio settings loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read audio settings '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "serde")]
    #[error("failed to parse audio settings: {0}")]
    Parse(#[from] serde_json::Error),
}
