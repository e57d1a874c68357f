//! Error types for testbed-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in testbed-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or has the wrong shape.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configured value is unusable.
    #[error("invalid config value for {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    /// Snapshot pattern failed to compile.
    #[error("invalid snapshot pattern: {0}")]
    Pattern(#[from] regex::Error),
}
