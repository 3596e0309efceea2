pub mod data;
pub mod error;
pub mod github;
pub mod service;

// Re-export common types
pub use data::{NewRelease, ReleaseEdit, RemoteAsset, RemoteRelease, RepoRef};
pub use error::{Result, ServiceError};
pub use github::{GitHubReleaseService, GITHUB_API_URL, GITHUB_UPLOAD_URL};
pub use service::{Lookup, ReleaseService};
