//! Picks the release a run operates on, creating or editing it when needed.

use publisher_config::ReleaseSpec;
use publisher_provider::{Lookup, NewRelease, ReleaseEdit, ReleaseService, RemoteRelease, RepoRef};
use publisher_utils::CallContext;
use tracing::info;

use crate::error::{PublishError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseAction {
    Created,
    Updated,
    Reused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelease {
    pub release: RemoteRelease,
    pub action: ReleaseAction,
}

pub struct ReleaseResolver<'a, S: ReleaseService + ?Sized> {
    service: &'a S,
    ctx: &'a CallContext,
    spec: &'a ReleaseSpec,
    repo: RepoRef,
}

impl<'a, S: ReleaseService + ?Sized> ReleaseResolver<'a, S> {
    pub fn new(service: &'a S, ctx: &'a CallContext, spec: &'a ReleaseSpec) -> Self {
        Self {
            service,
            ctx,
            spec,
            repo: RepoRef::new(spec.owner.as_str(), spec.repo.as_str()),
        }
    }

    /// Candidate order: a same-tag draft (with pickup-draft), then the release
    /// for the tag. No candidate means create; a candidate is edited only
    /// when overwrite is set and reused untouched otherwise.
    pub async fn resolve(&self) -> Result<ResolvedRelease> {
        self.build_release()
            .await
            .map_err(|e| PublishError::Release(Box::new(e)))
    }

    async fn build_release(&self) -> Result<ResolvedRelease> {
        let mut candidate = None;
        if self.spec.pickup_draft {
            candidate = self.find_draft().await?;
        }
        if candidate.is_none() {
            candidate = self.find_by_tag().await?;
        }

        match candidate {
            None => Ok(ResolvedRelease {
                release: self.create_release().await?,
                action: ReleaseAction::Created,
            }),
            Some(existing) if self.spec.overwrite => Ok(ResolvedRelease {
                release: self.edit_release(&existing).await?,
                action: ReleaseAction::Updated,
            }),
            Some(existing) => {
                info!("Reusing existing {} release", self.spec.tag);
                Ok(ResolvedRelease {
                    release: existing,
                    action: ReleaseAction::Reused,
                })
            }
        }
    }

    /// First draft carrying the tag, in the order the service lists them
    async fn find_draft(&self) -> Result<Option<RemoteRelease>> {
        let releases = self
            .service
            .list_releases(self.ctx, &self.repo)
            .await
            .map_err(|e| PublishError::remote("failed to list releases", e))?;

        let draft_id = releases
            .iter()
            .find(|r| r.draft && r.tag_name == self.spec.tag)
            .map(|r| r.id);

        match draft_id {
            Some(id) => {
                let draft = self
                    .service
                    .get_release(self.ctx, &self.repo, id)
                    .await
                    .map_err(|e| {
                        PublishError::remote(format!("failed to get release for ID {}", id), e)
                    })?;
                info!("Picked up {} release draft {}", self.spec.tag, id);
                Ok(Some(draft))
            }
            None => {
                info!("No release draft found");
                Ok(None)
            }
        }
    }

    async fn find_by_tag(&self) -> Result<Option<RemoteRelease>> {
        match self
            .service
            .get_release_by_tag(self.ctx, &self.repo, &self.spec.tag)
            .await
        {
            Lookup::Found(release) => {
                info!("Successfully retrieved {} release", self.spec.tag);
                Ok(Some(release))
            }
            Lookup::NotFound => {
                info!("Release {} not found", self.spec.tag);
                Ok(None)
            }
            Lookup::ServiceError(err) => Err(PublishError::remote(
                format!("failed to look up release {}", self.spec.tag),
                err,
            )),
        }
    }

    async fn create_release(&self) -> Result<RemoteRelease> {
        let spec = self.spec;
        let new_release = NewRelease {
            tag_name: spec.tag.clone(),
            draft: spec.draft,
            prerelease: spec.prerelease,
            name: spec.title.clone(),
            body: spec.note.clone(),
        };

        if spec.prerelease {
            info!("Release {} identified as a pre-release", spec.tag);
        } else {
            info!("Release {} identified as a full release", spec.tag);
        }
        if spec.draft {
            info!("Release {} will be created as draft (unpublished) release", spec.tag);
        } else {
            info!("Release {} will be created and published", spec.tag);
        }

        let release = self
            .service
            .create_release(self.ctx, &self.repo, &new_release)
            .await
            .map_err(|e| PublishError::remote("failed to create release", e))?;
        info!("Successfully created {} release", spec.tag);
        Ok(release)
    }

    async fn edit_release(&self, target: &RemoteRelease) -> Result<RemoteRelease> {
        let mut edit = ReleaseEdit {
            name: Some(self.spec.title.clone()),
            body: Some(self.spec.note.clone()),
            draft: None,
        };
        // a draft may get published here, a published release is never
        // turned back into a draft
        if target.draft {
            if !self.spec.draft {
                info!("Publishing a release draft");
            }
            edit.draft = Some(self.spec.draft);
        }

        let release = self
            .service
            .edit_release(self.ctx, &self.repo, target.id, &edit)
            .await
            .map_err(|e| PublishError::remote("failed to update release", e))?;
        info!("Successfully updated {} release", self.spec.tag);
        Ok(release)
    }
}
