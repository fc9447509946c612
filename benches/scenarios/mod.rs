//! Scenario benchmarks for the playback engine.
//!
//! Each one builds a coordinator or pool over simulated voices, so the
//! numbers measure bookkeeping cost only.

mod pool;
mod tick;
mod volume;

pub use pool::bench_pool;
pub use tick::bench_tick;
pub use volume::bench_volume;

use saavy_mixer::{
    io::MemoryStore,
    voice::{SimClip, SimVoice},
    AudioSettings, PlaybackCoordinator,
};

pub type Coordinator = PlaybackCoordinator<fn() -> SimVoice, MemoryStore>;

/// Coordinator with a fully prewarmed pool of `size` voices.
pub fn coordinator(size: usize) -> Coordinator {
    let mut settings = AudioSettings::default();
    settings.pool.initial_size = size;
    settings.pool.max_size = size;
    PlaybackCoordinator::new(settings, SimVoice::new as fn() -> SimVoice, MemoryStore::new())
}

/// Clip long enough that nothing ends during a benchmark.
pub fn endless_clip() -> SimClip {
    SimClip::new("bed", 1.0e9)
}
