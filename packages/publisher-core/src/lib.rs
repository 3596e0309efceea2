//! Release reconciliation: resolve the target release, then synchronize its assets.

pub mod checksum;
pub mod error;
pub mod publisher;
pub mod resolver;
pub mod synchronizer;

pub use checksum::{without_checksum_files, write_checksum_files};
pub use error::{PublishError, Result};
pub use publisher::{PublishReport, Publisher};
pub use resolver::{ReleaseAction, ReleaseResolver, ResolvedRelease};
pub use synchronizer::{asset_name, plan_uploads, AssetSynchronizer, PlannedUpload, SyncReport, UploadPlan};
