//! Discrete zoom levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A discrete resolution tier.
///
/// Levels are totally ordered from [`ZoomLevel::Default`] (least detail) to
/// [`ZoomLevel::Level3`] (most detail). Each level is backed by its own tile
/// set, registered as a [`ZoomConfigurationSet`](super::ZoomConfigurationSet).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ZoomLevel {
    #[default]
    Default,
    Level1,
    Level2,
    Level3,
}

impl ZoomLevel {
    /// All levels, lowest first.
    pub const ALL: [ZoomLevel; 4] = [
        ZoomLevel::Default,
        ZoomLevel::Level1,
        ZoomLevel::Level2,
        ZoomLevel::Level3,
    ];

    /// The next more detailed level, or `self` at the top.
    pub fn up(self) -> ZoomLevel {
        match self {
            ZoomLevel::Default => ZoomLevel::Level1,
            ZoomLevel::Level1 => ZoomLevel::Level2,
            ZoomLevel::Level2 | ZoomLevel::Level3 => ZoomLevel::Level3,
        }
    }

    /// The next less detailed level, or `self` at the bottom.
    pub fn down(self) -> ZoomLevel {
        match self {
            ZoomLevel::Default | ZoomLevel::Level1 => ZoomLevel::Default,
            ZoomLevel::Level2 => ZoomLevel::Level1,
            ZoomLevel::Level3 => ZoomLevel::Level2,
        }
    }

    /// Name used in manifests and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            ZoomLevel::Default => "default",
            ZoomLevel::Level1 => "level1",
            ZoomLevel::Level2 => "level2",
            ZoomLevel::Level3 => "level3",
        }
    }
}

impl fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoomLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ZoomLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown zoom level '{s}' (expected default, level1, level2 or level3)")
            })
    }
}
