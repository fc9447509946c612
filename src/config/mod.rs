// Purpose: startup configuration - category defaults, pool sizing, fade times
// Loaded once by the composition root; built-in defaults cover every field

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::mixer::Category;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSettings {
    pub categories: Vec<CategorySettings>,
    pub pool: PoolSettings,
    pub fades: FadeSettings,
    pub persistence: PersistenceSettings,
    /// Scale every other category's output by the Master volume.
    pub master_gates_all: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySettings {
    pub category: Category,
    pub volume: f32,
    pub muted: bool,
    /// Advisory soft cap on concurrent voices. Not enforced by the pool.
    pub max_simultaneous: usize,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub initial_size: usize,
    pub max_size: usize,
}

/// Default ramp durations in seconds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSettings {
    pub fade_in: f32,
    pub fade_out: f32,
}

/// Key prefixes for persisted volume and mute entries (`<prefix>_<Category>`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceSettings {
    pub volume_prefix: String,
    pub mute_prefix: String,
}

impl CategorySettings {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            ..Self::default()
        }
    }
}

impl Default for CategorySettings {
    fn default() -> Self {
        Self {
            category: Category::default(),
            volume: 1.0,
            muted: false,
            max_simultaneous: 10,
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            initial_size: 10,
            max_size: 50,
        }
    }
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self {
            fade_in: 0.5,
            fade_out: 0.5,
        }
    }
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            volume_prefix: "audio_volume".to_string(),
            mute_prefix: "audio_mute".to_string(),
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            categories: Category::ALL.into_iter().map(CategorySettings::new).collect(),
            pool: PoolSettings::default(),
            fades: FadeSettings::default(),
            persistence: PersistenceSettings::default(),
            master_gates_all: true,
        }
    }
}

impl AudioSettings {
    /// Append default entries for any category the settings do not mention.
    pub fn ensure_all_categories(&mut self) {
        for category in Category::ALL {
            if !self.categories.iter().any(|cs| cs.category == category) {
                self.categories.push(CategorySettings::new(category));
            }
        }
    }

    /// Settings for `category`, or defaults when it is not listed.
    pub fn category(&self, category: Category) -> CategorySettings {
        self.categories
            .iter()
            .find(|cs| cs.category == category)
            .cloned()
            .unwrap_or_else(|| CategorySettings::new(category))
    }

    /// Clamp every value into its valid range.
    pub fn normalized(mut self) -> Self {
        for cs in &mut self.categories {
            cs.volume = if cs.volume.is_finite() {
                cs.volume.clamp(0.0, 1.0)
            } else {
                1.0
            };
        }
        self.pool.max_size = self.pool.max_size.max(1);
        self.pool.initial_size = self.pool.initial_size.min(self.pool.max_size);
        self.fades.fade_in = non_negative(self.fades.fade_in);
        self.fades.fade_out = non_negative(self.fades.fade_out);
        self
    }
}

fn non_negative(seconds: f32) -> f32 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}

#[cfg(feature = "serde")]
mod load {
    use std::path::Path;

    use tracing::{info, warn};

    use super::AudioSettings;
    use crate::error::ConfigError;

    impl AudioSettings {
        pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
            let mut settings: AudioSettings = serde_json::from_str(text)?;
            settings.ensure_all_categories();
            Ok(settings.normalized())
        }

        pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let settings = Self::from_json_str(&text)?;
            info!(path = %path.display(), "loaded audio settings");
            Ok(settings)
        }

        /// Load `path`, falling back to built-in defaults when it is missing
        /// or malformed.
        pub fn load_or_default(path: impl AsRef<Path>) -> Self {
            match Self::load(path) {
                Ok(settings) => settings,
                Err(err) => {
                    warn!(error = %err, "no usable audio settings, using defaults");
                    Self::default()
                }
            }
        }
    }
}
