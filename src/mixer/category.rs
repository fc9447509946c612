use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical grouping of sounds that share one volume and mute control.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Category {
    /// Gates every other category when `master_gates_all` is enabled.
    Master,
    /// Background music and theme tracks.
    Music,
    /// Gameplay sound effects.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "SFX"))]
    Sfx,
    /// Menu clicks, hovers and other interface feedback.
    #[cfg_attr(feature = "serde", serde(rename = "UI"))]
    Ui,
    /// Dialogue and character lines.
    Voice,
    /// Environmental beds (wind, rain, room tone).
    Ambient,
}

impl Category {
    pub const COUNT: usize = 6;

    /// All categories in declaration order. Sweeps iterate in this order.
    pub const ALL: [Category; Self::COUNT] = [
        Category::Master,
        Category::Music,
        Category::Sfx,
        Category::Ui,
        Category::Voice,
        Category::Ambient,
    ];

    /// Dense index for per-category tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name used in persisted keys and settings files.
    pub const fn name(self) -> &'static str {
        match self {
            Category::Master => "Master",
            Category::Music => "Music",
            Category::Sfx => "SFX",
            Category::Ui => "UI",
            Category::Voice => "Voice",
            Category::Ambient => "Ambient",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown audio category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_declaration_order() {
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn parses_display_names_case_insensitively() {
        assert_eq!("sfx".parse::<Category>(), Ok(Category::Sfx));
        assert_eq!("UI".parse::<Category>(), Ok(Category::Ui));
        assert_eq!("Ambient".parse::<Category>(), Ok(Category::Ambient));
        assert!("dialogue".parse::<Category>().is_err());
    }

    #[test]
    fn default_is_sound_effects() {
        assert_eq!(Category::default(), Category::Sfx);
        assert_eq!(Category::Sfx.to_string(), "SFX");
    }
}
