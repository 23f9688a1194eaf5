//! Tile set manifests.
//!
//! A manifest describes every zoom level of a tile set in one JSON document:
//!
//! ```json
//! {
//!   "levels": {
//!     "default": { "template": "tiger400/crop_%col%_%row%.png",
//!                  "tile_width": 100, "tile_height": 100,
//!                  "image_width": 400, "image_height": 300 },
//!     "level1":  { "template": "tiger800/crop_%col%_%row%.png",
//!                  "tile_width": 100, "tile_height": 100,
//!                  "image_width": 800, "image_height": 600 }
//!   }
//! }
//! ```
//!
//! Each entry is validated through [`ZoomConfigurationSet::new`]; the
//! `default` level is mandatory.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ManifestError};
use crate::zoom::{ZoomConfigurationSet, ZoomLevel, ZoomStateMachine};

/// Default manifest file name inside a tile set directory.
pub const MANIFEST_FILE_NAME: &str = "tileset.json";

/// One level entry, as written in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub template: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub image_width: u32,
    pub image_height: u32,
}

impl LevelEntry {
    fn to_configuration(&self) -> Result<ZoomConfigurationSet, ConfigError> {
        ZoomConfigurationSet::new(
            self.template.clone(),
            self.tile_width,
            self.tile_height,
            self.image_width,
            self.image_height,
        )
    }
}

impl From<&ZoomConfigurationSet> for LevelEntry {
    fn from(config: &ZoomConfigurationSet) -> Self {
        Self {
            template: config.template().to_string(),
            tile_width: config.tile_width(),
            tile_height: config.tile_height(),
            image_width: config.image_width(),
            image_height: config.image_height(),
        }
    }
}

/// A parsed tile set manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSetManifest {
    pub levels: BTreeMap<ZoomLevel, LevelEntry>,
}

impl TileSetManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(json).map_err(|e| ManifestError::Parse(e.to_string()))
    }

    /// Read and parse a manifest file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ManifestError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::from_json(&json)
    }

    /// Validate every level, lowest first.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid level, or if `default` is missing.
    pub fn configurations(&self) -> Result<Vec<(ZoomLevel, ZoomConfigurationSet)>, ManifestError> {
        if !self.levels.contains_key(&ZoomLevel::Default) {
            return Err(ConfigError::MissingDefaultLevel.into());
        }

        self.levels
            .iter()
            .map(|(level, entry)| {
                entry
                    .to_configuration()
                    .map(|config| (*level, config))
                    .map_err(|source| ManifestError::InvalidLevel {
                        level: level.to_string(),
                        source,
                    })
            })
            .collect()
    }

    /// Build a zoom state machine with every level bound.
    pub fn into_zoom_state(self) -> Result<ZoomStateMachine, ManifestError> {
        let mut levels = self.configurations()?.into_iter();

        // configurations() guarantees default is present and sorts first
        let Some((ZoomLevel::Default, default)) = levels.next() else {
            return Err(ConfigError::MissingDefaultLevel.into());
        };

        let mut zoom = ZoomStateMachine::new(default);
        for (level, config) in levels {
            zoom.add_configuration_set(level, config);
        }
        Ok(zoom)
    }
}
