use publisher_utils::UnknownAlgorithm;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    MissingSetting(&'static str),

    #[error("release can only be published from tag events, got {0}")]
    NotTagEvent(String),

    #[error("unknown file_exists value {0}, expected overwrite, fail or skip")]
    UnknownFileExists(String),

    #[error(transparent)]
    Checksum(#[from] UnknownAlgorithm),

    #[error("invalid file pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
