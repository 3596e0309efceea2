//! Remote release-service capability used by the resolver and synchronizer

use async_trait::async_trait;
use bytes::Bytes;

use crate::data::{NewRelease, ReleaseEdit, RemoteAsset, RemoteRelease, RepoRef};
use crate::error::{Result, ServiceError};
use publisher_utils::CallContext;

/// Outcome of a lookup where a miss is an expected answer rather than a failure
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    ServiceError(ServiceError),
}

impl<T> Lookup<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Lookup::Found(value),
            Err(ServiceError::NotFound(_)) => Lookup::NotFound,
            Err(err) => Lookup::ServiceError(err),
        }
    }
}

/// Operations consumed from the release-hosting service.
///
/// Every call takes the run's [`CallContext`]; implementations must honor its
/// cancellation token and deadline. Listing calls return the complete,
/// remote-ordered collection (pagination is the implementation's concern).
#[async_trait]
pub trait ReleaseService: Send + Sync {
    async fn list_releases(&self, ctx: &CallContext, repo: &RepoRef) -> Result<Vec<RemoteRelease>>;

    async fn get_release(&self, ctx: &CallContext, repo: &RepoRef, id: u64)
        -> Result<RemoteRelease>;

    async fn get_release_by_tag(
        &self,
        ctx: &CallContext,
        repo: &RepoRef,
        tag: &str,
    ) -> Lookup<RemoteRelease>;

    async fn create_release(
        &self,
        ctx: &CallContext,
        repo: &RepoRef,
        release: &NewRelease,
    ) -> Result<RemoteRelease>;

    async fn edit_release(
        &self,
        ctx: &CallContext,
        repo: &RepoRef,
        id: u64,
        edit: &ReleaseEdit,
    ) -> Result<RemoteRelease>;

    async fn list_release_assets(
        &self,
        ctx: &CallContext,
        repo: &RepoRef,
        release_id: u64,
    ) -> Result<Vec<RemoteAsset>>;

    async fn delete_release_asset(
        &self,
        ctx: &CallContext,
        repo: &RepoRef,
        asset_id: u64,
    ) -> Result<()>;

    async fn upload_release_asset(
        &self,
        ctx: &CallContext,
        repo: &RepoRef,
        release_id: u64,
        name: &str,
        content: Bytes,
    ) -> Result<RemoteAsset>;
}
