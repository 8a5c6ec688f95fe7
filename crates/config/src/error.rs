use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    Parse(String),

    /// Structurally valid TOML that describes an unusable setup.
    #[error("config validation error: {0}")]
    Validation(String),
}
