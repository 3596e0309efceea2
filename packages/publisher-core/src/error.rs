//! Error taxonomy for a publish run. Every variant is fatal; the lookup miss
//! that drives release creation never surfaces here.

use publisher_config::ConfigError;
use publisher_provider::ServiceError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    /// Anything that went wrong while picking, creating or editing the release
    #[error("failed to retrieve or create a release: {0}")]
    Release(#[source] Box<PublishError>),

    #[error("{action}: {source}")]
    Remote {
        action: String,
        #[source]
        source: ServiceError,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("asset file {0} already exists")]
    Conflict(String),

    #[error("multiple files would be uploaded as asset {0}")]
    DuplicateAsset(String),

    #[error("failed to {action} {}: {source}", path.display())]
    LocalIo {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PublishError {
    pub(crate) fn remote(action: impl Into<String>, source: ServiceError) -> Self {
        PublishError::Remote {
            action: action.into(),
            source,
        }
    }

    pub(crate) fn local_io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PublishError::LocalIo {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PublishError>;
