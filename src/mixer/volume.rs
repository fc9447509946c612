use std::collections::HashMap;

use tracing::{debug, warn};

use super::Category;
use crate::{
    config::{AudioSettings, PersistenceSettings},
    io::KeyValueStore,
    voice::Voice,
};

/*
Category Volume Composition
===========================

Every voice has two volume components:

  relative   How loud the sound was authored to be, as a fraction of its
             category. A footstep requested at 0.5 has relative = 0.5.

  gain       The category's output gain at the moment the core last wrote
             the voice's volume. With Master gating enabled this is
             volume(category) x volume(Master); muted categories have 0.

The host voice only stores the product:

    voice.volume = relative x gain

When a slider moves, the new volume is derived from what the voice holds
right now rather than from the requested volume, so host-side edits since
the last write are carried forward:

    relative = voice.volume / previous_gain     (previous_gain > 0)
    voice.volume = relative x new_gain

Example: voice at 0.5 with SFX at 1.0, slider moves to 0.25

    relative = 0.5 / 1.0 = 0.5
    volume   = 0.5 x 0.25 = 0.125

Voices in the middle of a fade are not handed to the mixer; their ramp
endpoints are rescaled instead (see the fade module).

Division by a zero gain is impossible to undo - a muted voice holds 0.0 and
has lost its ratio. For that case the last known relative value is kept, so
unmuting brings the voice back to its authored loudness instead of leaving
it silent.
*/

/// Per-voice volume bookkeeping used when category settings change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceMix {
    relative: f32,
    gain: f32,
}

impl VoiceMix {
    pub fn new(relative: f32, gain: f32) -> Self {
        Self { relative, gain }
    }

    pub fn relative(&self) -> f32 {
        self.relative
    }

    /// Category gain in effect when the volume was last written.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Volume the voice should hold under the recorded gain.
    pub fn output(&self) -> f32 {
        (self.relative * self.gain).clamp(0.0, 1.0)
    }

    /// Re-derive the voice volume for `gain`, given what it currently holds.
    pub fn reapply(&mut self, current: f32, gain: f32) -> f32 {
        if self.gain > 0.0 {
            self.relative = current / self.gain;
        }
        self.gain = gain;
        self.output()
    }
}

/// Per-category volume and mute state with write-through persistence.
pub struct CategoryMixer<S: KeyValueStore> {
    volumes: HashMap<Category, f32>,
    muted: HashMap<Category, bool>,
    limits: HashMap<Category, usize>,
    keys: PersistenceSettings,
    master_gates_all: bool,
    store: S,
}

impl<S: KeyValueStore> CategoryMixer<S> {
    /// Initialise from configured defaults, then overlay persisted values.
    pub fn new(settings: &AudioSettings, store: S) -> Self {
        let mut mixer = Self {
            volumes: HashMap::new(),
            muted: HashMap::new(),
            limits: HashMap::new(),
            keys: settings.persistence.clone(),
            master_gates_all: settings.master_gates_all,
            store,
        };

        for cs in &settings.categories {
            mixer.volumes.insert(cs.category, cs.volume.clamp(0.0, 1.0));
            mixer.muted.insert(cs.category, cs.muted);
            mixer.limits.insert(cs.category, cs.max_simultaneous);
        }

        mixer.load();
        mixer
    }

    /// Effective category volume: 0 while muted, else the stored volume.
    pub fn volume(&self, category: Category) -> f32 {
        if self.is_muted(category) {
            0.0
        } else {
            self.stored_volume(category)
        }
    }

    /// Volume as set by the user, ignoring mute. Defaults to 1.0.
    pub fn stored_volume(&self, category: Category) -> f32 {
        self.volumes.get(&category).copied().unwrap_or(1.0)
    }

    /// Store a clamped volume and persist. Active voices are not touched.
    pub fn set_volume(&mut self, category: Category, volume: f32) {
        if !volume.is_finite() {
            warn!(%category, volume, "ignoring non-finite category volume");
            return;
        }
        self.volumes.insert(category, volume.clamp(0.0, 1.0));
        self.persist();
    }

    pub fn is_muted(&self, category: Category) -> bool {
        self.muted.get(&category).copied().unwrap_or(false)
    }

    /// Store the mute flag and persist. Active voices are not touched.
    pub fn set_mute(&mut self, category: Category, muted: bool) {
        self.muted.insert(category, muted);
        self.persist();
    }

    /// Gain applied to voices of `category`, Master included when gating.
    pub fn output_gain(&self, category: Category) -> f32 {
        let volume = self.volume(category);
        if self.master_gates_all && category != Category::Master {
            volume * self.volume(Category::Master)
        } else {
            volume
        }
    }

    pub fn master_gates_all(&self) -> bool {
        self.master_gates_all
    }

    /// Advisory concurrent voice limit configured for `category`.
    pub fn max_simultaneous(&self, category: Category) -> Option<usize> {
        self.limits.get(&category).copied()
    }

    /// Rescale every given voice to the category's current output gain,
    /// keeping each voice's relative loudness.
    pub fn apply_to_active<'a, V, I>(&self, category: Category, voices: I)
    where
        V: Voice + 'a,
        I: IntoIterator<Item = (&'a mut V, &'a mut VoiceMix)>,
    {
        let gain = self.output_gain(category);
        let mut applied = 0usize;
        for (voice, mix) in voices {
            let volume = mix.reapply(voice.volume(), gain);
            voice.set_volume(volume);
            applied += 1;
        }
        debug!(%category, gain, voices = applied, "applied category volume");
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn volume_key(&self, category: Category) -> String {
        format!("{}_{}", self.keys.volume_prefix, category)
    }

    fn mute_key(&self, category: Category) -> String {
        format!("{}_{}", self.keys.mute_prefix, category)
    }

    fn load(&mut self) {
        for category in Category::ALL {
            let volume_key = self.volume_key(category);
            if self.store.has_key(&volume_key) {
                match self.store.get_float(&volume_key) {
                    Some(v) if v.is_finite() => {
                        self.volumes.insert(category, v.clamp(0.0, 1.0));
                    }
                    _ => warn!(key = %volume_key, "ignoring unreadable persisted volume"),
                }
            }

            let mute_key = self.mute_key(category);
            if self.store.has_key(&mute_key) {
                if let Some(flag) = self.store.get_int(&mute_key) {
                    self.muted.insert(category, flag == 1);
                }
            }
        }
    }

    fn persist(&mut self) {
        let mut volumes: Vec<(String, f32)> = self
            .volumes
            .iter()
            .map(|(&c, &v)| (self.volume_key(c), v))
            .collect();
        volumes.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, volume) in volumes {
            self.store.set_float(&key, volume);
        }

        let mut mutes: Vec<(String, bool)> = self
            .muted
            .iter()
            .map(|(&c, &m)| (self.mute_key(c), m))
            .collect();
        mutes.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, muted) in mutes {
            self.store.set_int(&key, i32::from(muted));
        }

        if let Err(err) = self.store.save() {
            warn!(error = %err, "failed to persist category settings");
        }
    }
}
