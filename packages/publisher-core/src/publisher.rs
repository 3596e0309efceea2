use std::sync::Arc;

use publisher_config::{ReleaseSpec, Settings};
use publisher_provider::{ReleaseService, RepoRef};
use publisher_utils::CallContext;
use tracing::info;

use crate::checksum::{without_checksum_files, write_checksum_files};
use crate::error::Result;
use crate::resolver::{ReleaseAction, ReleaseResolver};
use crate::synchronizer::{AssetSynchronizer, SyncReport};

/// Returned only when the whole run succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub release_id: u64,
    pub tag: String,
    pub action: ReleaseAction,
    pub assets: SyncReport,
}

/// Runs checksum generation, release resolution and asset synchronization
/// in that order against one service, stopping at the first error.
pub struct Publisher<S: ReleaseService + ?Sized> {
    service: Arc<S>,
    ctx: CallContext,
}

impl<S: ReleaseService + ?Sized> Publisher<S> {
    pub fn new(service: Arc<S>, ctx: CallContext) -> Self {
        Self { service, ctx }
    }

    pub fn context(&self) -> &CallContext {
        &self.ctx
    }

    pub async fn publish_settings(&self, settings: &Settings) -> Result<PublishReport> {
        let spec = settings.validate()?;
        self.publish(&spec).await
    }

    pub async fn publish(&self, spec: &ReleaseSpec) -> Result<PublishReport> {
        let repo = RepoRef::new(spec.owner.as_str(), spec.repo.as_str());
        let service = self.service.as_ref();

        let mut files = without_checksum_files(&spec.files, &spec.checksum);
        let listings = write_checksum_files(&files, &spec.checksum).await?;
        files.extend(listings);

        let resolved = ReleaseResolver::new(service, &self.ctx, spec)
            .resolve()
            .await?;
        let assets = AssetSynchronizer::new(service, &self.ctx, &repo, spec.file_exists)
            .sync(resolved.release.id, &files)
            .await?;

        info!(
            "Release {} ({}) ready: {} uploaded, {} replaced, {} skipped",
            spec.tag,
            resolved.release.id,
            assets.uploaded.len(),
            assets.replaced.len(),
            assets.skipped.len()
        );

        Ok(PublishReport {
            release_id: resolved.release.id,
            tag: spec.tag.clone(),
            action: resolved.action,
            assets,
        })
    }
}
