//! Release Publisher - reconcile a tagged release and its artifacts on GitHub
//!
//! This library resolves the release a CI run should publish to (reusing a
//! draft, updating, or creating it) and synchronizes local files as release
//! assets under a configurable conflict policy.

pub use publisher_config as config;
pub use publisher_core as core;
pub use publisher_provider as provider;
pub use publisher_utils as utils;

// Re-export commonly used types for convenience
pub use publisher_config::{FileExistsPolicy, ReleaseSpec, Settings};
pub use publisher_core::{PublishError, PublishReport, Publisher, ReleaseAction};
pub use publisher_provider::{GitHubReleaseService, Lookup, ReleaseService, RepoRef};
pub use publisher_utils::CallContext;
