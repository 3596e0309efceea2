//! Reconciles the desired file list against the assets already on a release.

use bytes::Bytes;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use publisher_config::FileExistsPolicy;
use publisher_provider::{ReleaseService, RemoteAsset, RepoRef};
use publisher_utils::CallContext;
use tracing::info;

use crate::error::{PublishError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Asset names uploaded, in upload order
    pub uploaded: Vec<String>,
    /// Pre-existing assets deleted before their replacement was uploaded
    pub replaced: Vec<String>,
    /// Files left out because an asset with their name already existed
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpload {
    pub path: PathBuf,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPlan {
    pub uploads: Vec<PlannedUpload>,
    pub skipped: Vec<String>,
}

/// Base file name a path is published under
pub fn asset_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| {
            PublishError::local_io(
                "name",
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })
}

/// Applies the conflict policy to every file, in input order. A `fail`
/// collision aborts before anything is selected, as do two selected files
/// sharing a base name.
pub fn plan_uploads(
    files: &[PathBuf],
    assets: &[RemoteAsset],
    policy: FileExistsPolicy,
) -> Result<UploadPlan> {
    let mut plan = UploadPlan::default();
    let mut names = HashSet::new();

    for path in files {
        let name = asset_name(path)?;
        if assets.iter().any(|asset| asset.name == name) {
            match policy {
                FileExistsPolicy::Overwrite => {}
                FileExistsPolicy::Fail => return Err(PublishError::Conflict(name)),
                FileExistsPolicy::Skip => {
                    info!("Skipping pre-existing {} artifact", name);
                    plan.skipped.push(name);
                    continue;
                }
            }
        }

        // only names that will actually be uploaded can clash with each other
        if !names.insert(name.clone()) {
            return Err(PublishError::DuplicateAsset(name));
        }
        plan.uploads.push(PlannedUpload {
            path: path.clone(),
            name,
        });
    }

    Ok(plan)
}

pub struct AssetSynchronizer<'a, S: ReleaseService + ?Sized> {
    service: &'a S,
    ctx: &'a CallContext,
    repo: &'a RepoRef,
    policy: FileExistsPolicy,
}

impl<'a, S: ReleaseService + ?Sized> AssetSynchronizer<'a, S> {
    pub fn new(
        service: &'a S,
        ctx: &'a CallContext,
        repo: &'a RepoRef,
        policy: FileExistsPolicy,
    ) -> Self {
        Self {
            service,
            ctx,
            repo,
            policy,
        }
    }

    /// Uploads one file at a time; each file's delete and upload finish
    /// before the next file is read.
    pub async fn sync(&self, release_id: u64, files: &[PathBuf]) -> Result<SyncReport> {
        let assets = self
            .service
            .list_release_assets(self.ctx, self.repo, release_id)
            .await
            .map_err(|e| PublishError::remote("failed to fetch existing assets", e))?;

        let plan = plan_uploads(files, &assets, self.policy)?;
        let mut report = SyncReport {
            skipped: plan.skipped,
            ..SyncReport::default()
        };

        for upload in plan.uploads {
            let content = tokio::fs::read(&upload.path)
                .await
                .map_err(|e| PublishError::local_io("read", &upload.path, e))?;

            for asset in assets.iter().filter(|asset| asset.name == upload.name) {
                self.service
                    .delete_release_asset(self.ctx, self.repo, asset.id)
                    .await
                    .map_err(|e| {
                        PublishError::remote(
                            format!("failed to delete {} artifact", upload.path.display()),
                            e,
                        )
                    })?;
                info!("Successfully deleted old {} artifact", asset.name);
                report.replaced.push(asset.name.clone());
            }

            self.service
                .upload_release_asset(
                    self.ctx,
                    self.repo,
                    release_id,
                    &upload.name,
                    Bytes::from(content),
                )
                .await
                .map_err(|e| {
                    PublishError::remote(
                        format!("failed to upload {} artifact", upload.path.display()),
                        e,
                    )
                })?;
            info!("Successfully uploaded {} artifact", upload.path.display());
            report.uploaded.push(upload.name);
        }

        Ok(report)
    }
}
