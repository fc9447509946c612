//! Per-frame snapshot of coordinator state for the widgets
//!
//! Captured once per frame so rendering never touches the engine.

use saavy_mixer::{
    io::KeyValueStore, mixer::Category, pool::PoolStats, PlaybackCoordinator, VoiceFactory,
};

/// One row of the mixer panel
#[derive(Clone, Copy, Debug)]
pub struct CategoryRow {
    pub category: Category,
    /// Slider value, ignoring mute
    pub volume: f32,
    pub muted: bool,
    /// Gain actually applied to voices, Master included
    pub gain: f32,
    pub active: usize,
    pub limit: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct MixerSnapshot {
    pub rows: [CategoryRow; Category::COUNT],
    pub selected: Category,
    pub pool: PoolStats,
    pub fades: usize,
    /// Active voices across every category
    pub active: usize,
    pub master_gates_all: bool,
}

impl MixerSnapshot {
    pub fn capture<F, S>(coordinator: &PlaybackCoordinator<F, S>, selected: Category) -> Self
    where
        F: VoiceFactory,
        S: KeyValueStore,
    {
        let mixer = coordinator.mixer();
        let rows = Category::ALL.map(|category| CategoryRow {
            category,
            volume: mixer.stored_volume(category),
            muted: mixer.is_muted(category),
            gain: mixer.output_gain(category),
            active: coordinator.active_count(category),
            limit: mixer.max_simultaneous(category),
        });

        Self {
            rows,
            selected,
            pool: coordinator.pool_stats(),
            fades: coordinator.fades().len(),
            active: coordinator.total_active(),
            master_gates_all: mixer.master_gates_all(),
        }
    }
}
