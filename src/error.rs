use thiserror::Error;

/// Errors raised when a zoom configuration set is registered.
///
/// These are fatal construction errors: a configuration that fails validation
/// never reaches the planner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A tile or image dimension is zero
    #[error("Invalid {field}: must be greater than 0, got {value}")]
    InvalidDimension { field: &'static str, value: u32 },

    /// The tile path template is empty
    #[error("Tile path template is empty")]
    MissingTemplate,

    /// The tile path template lacks a required placeholder
    #[error("Tile path template '{template}' is missing the {placeholder} placeholder")]
    MissingPlaceholder {
        template: String,
        placeholder: &'static str,
    },

    /// No configuration is bound to the DEFAULT zoom level
    #[error("No configuration set registered for the default zoom level")]
    MissingDefaultLevel,
}

/// Errors that can occur when reading or decoding a tile asset.
///
/// Tile-scoped: the loader skips the tile and retries it on the next fill pass.
#[derive(Debug, Clone, Error)]
pub enum AssetError {
    /// Asset does not exist
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Asset path escapes the asset root or is otherwise unusable
    #[error("Invalid asset path: {0}")]
    InvalidPath(String),

    /// Reading the asset failed
    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },

    /// The asset bytes could not be decoded into an image
    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },
}

impl AssetError {
    /// Path of the asset this error refers to.
    pub fn path(&self) -> &str {
        match self {
            AssetError::NotFound(path) | AssetError::InvalidPath(path) => path,
            AssetError::Io { path, .. } | AssetError::Decode { path, .. } => path,
        }
    }
}

/// Errors that can occur when loading a tile set manifest
#[derive(Debug, Clone, Error)]
pub enum ManifestError {
    /// The manifest file could not be read
    #[error("Failed to read manifest {path}: {message}")]
    Io { path: String, message: String },

    /// The manifest is not valid JSON or has the wrong shape
    #[error("Failed to parse manifest: {0}")]
    Parse(String),

    /// A level entry failed validation
    #[error("Invalid configuration for zoom level {level}: {source}")]
    InvalidLevel {
        level: String,
        #[source]
        source: ConfigError,
    },

    /// Manifest-wide validation failure
    #[error(transparent)]
    Config(#[from] ConfigError),
}
