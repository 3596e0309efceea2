#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use publisher_config::{ChecksumOptions, FileExistsPolicy, ReleaseSpec};
use publisher_provider::{
    Lookup, NewRelease, ReleaseEdit, ReleaseService, RemoteAsset, RemoteRelease, RepoRef,
    Result, ServiceError,
};
use publisher_utils::CallContext;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListReleases,
    GetRelease(u64),
    GetReleaseByTag(String),
    CreateRelease(NewRelease),
    EditRelease(u64, ReleaseEdit),
    ListAssets(u64),
    DeleteAsset(u64),
    Upload(u64, String),
}

#[derive(Default)]
struct State {
    releases: Vec<RemoteRelease>,
    contents: HashMap<u64, Vec<u8>>,
    next_id: u64,
    calls: Vec<Call>,
    failing: HashSet<&'static str>,
}

/// In-memory release host that records every call.
///
/// Like GitHub, lookups by tag only see published releases; drafts are
/// reachable through listing and fetching by id.
#[derive(Default)]
pub struct FakeReleaseService {
    state: Mutex<State>,
}

impl FakeReleaseService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_release(&self, tag: &str, draft: bool) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.releases.push(RemoteRelease {
            id,
            tag_name: tag.to_string(),
            draft,
            prerelease: false,
            name: Some(format!("old {}", tag)),
            body: Some("old notes".to_string()),
            assets: vec![],
        });
        id
    }

    pub fn add_asset(&self, release_id: u64, name: &str, content: &[u8]) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.contents.insert(id, content.to_vec());
        let release = state
            .releases
            .iter_mut()
            .find(|r| r.id == release_id)
            .unwrap();
        release.assets.push(RemoteAsset {
            id,
            name: name.to_string(),
            size: content.len() as u64,
        });
        id
    }

    /// Makes the named operation fail with a 500 from now on
    pub fn fail_on(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn releases(&self) -> Vec<RemoteRelease> {
        self.state.lock().unwrap().releases.clone()
    }

    pub fn release(&self, id: u64) -> RemoteRelease {
        self.releases().into_iter().find(|r| r.id == id).unwrap()
    }

    pub fn asset_content(&self, release_id: u64, name: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        let release = state.releases.iter().find(|r| r.id == release_id)?;
        let asset = release.assets.iter().find(|a| a.name == name)?;
        state.contents.get(&asset.id).cloned()
    }

    pub fn count_calls(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(operation) {
            return Err(ServiceError::Status {
                status: 500,
                message: format!("{} unavailable", operation),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ReleaseService for FakeReleaseService {
    async fn list_releases(&self, ctx: &CallContext, _repo: &RepoRef) -> Result<Vec<RemoteRelease>> {
        ctx.run(async {}).await?;
        self.record("list_releases", Call::ListReleases)?;
        Ok(self.releases())
    }

    async fn get_release(
        &self,
        ctx: &CallContext,
        _repo: &RepoRef,
        id: u64,
    ) -> Result<RemoteRelease> {
        ctx.run(async {}).await?;
        self.record("get_release", Call::GetRelease(id))?;
        self.releases()
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("release {}", id)))
    }

    async fn get_release_by_tag(
        &self,
        ctx: &CallContext,
        _repo: &RepoRef,
        tag: &str,
    ) -> Lookup<RemoteRelease> {
        if let Err(err) = ctx.run(async {}).await {
            return Lookup::ServiceError(err.into());
        }
        if let Err(err) = self.record("get_release_by_tag", Call::GetReleaseByTag(tag.to_string())) {
            return Lookup::ServiceError(err);
        }
        match self
            .releases()
            .into_iter()
            .find(|r| !r.draft && r.tag_name == tag)
        {
            Some(release) => Lookup::Found(release),
            None => Lookup::NotFound,
        }
    }

    async fn create_release(
        &self,
        ctx: &CallContext,
        _repo: &RepoRef,
        release: &NewRelease,
    ) -> Result<RemoteRelease> {
        ctx.run(async {}).await?;
        self.record("create_release", Call::CreateRelease(release.clone()))?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let created = RemoteRelease {
            id: state.next_id,
            tag_name: release.tag_name.clone(),
            draft: release.draft,
            prerelease: release.prerelease,
            name: Some(release.name.clone()),
            body: Some(release.body.clone()),
            assets: vec![],
        };
        state.releases.push(created.clone());
        Ok(created)
    }

    async fn edit_release(
        &self,
        ctx: &CallContext,
        _repo: &RepoRef,
        id: u64,
        edit: &ReleaseEdit,
    ) -> Result<RemoteRelease> {
        ctx.run(async {}).await?;
        self.record("edit_release", Call::EditRelease(id, edit.clone()))?;
        let mut state = self.state.lock().unwrap();
        let release = state
            .releases
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("release {}", id)))?;
        if let Some(name) = &edit.name {
            release.name = Some(name.clone());
        }
        if let Some(body) = &edit.body {
            release.body = Some(body.clone());
        }
        if let Some(draft) = edit.draft {
            release.draft = draft;
        }
        Ok(release.clone())
    }

    async fn list_release_assets(
        &self,
        ctx: &CallContext,
        _repo: &RepoRef,
        release_id: u64,
    ) -> Result<Vec<RemoteAsset>> {
        ctx.run(async {}).await?;
        self.record("list_release_assets", Call::ListAssets(release_id))?;
        self.releases()
            .into_iter()
            .find(|r| r.id == release_id)
            .map(|r| r.assets)
            .ok_or_else(|| ServiceError::NotFound(format!("release {}", release_id)))
    }

    async fn delete_release_asset(
        &self,
        ctx: &CallContext,
        _repo: &RepoRef,
        asset_id: u64,
    ) -> Result<()> {
        ctx.run(async {}).await?;
        self.record("delete_release_asset", Call::DeleteAsset(asset_id))?;
        let mut state = self.state.lock().unwrap();
        let mut found = false;
        for release in state.releases.iter_mut() {
            let before = release.assets.len();
            release.assets.retain(|a| a.id != asset_id);
            found |= release.assets.len() != before;
        }
        state.contents.remove(&asset_id);
        if found {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("asset {}", asset_id)))
        }
    }

    async fn upload_release_asset(
        &self,
        ctx: &CallContext,
        _repo: &RepoRef,
        release_id: u64,
        name: &str,
        content: Bytes,
    ) -> Result<RemoteAsset> {
        ctx.run(async {}).await?;
        self.record(
            "upload_release_asset",
            Call::Upload(release_id, name.to_string()),
        )?;
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        let release = state
            .releases
            .iter_mut()
            .find(|r| r.id == release_id)
            .ok_or_else(|| ServiceError::NotFound(format!("release {}", release_id)))?;
        if release.assets.iter().any(|a| a.name == name) {
            return Err(ServiceError::Status {
                status: 422,
                message: "already_exists".to_string(),
            });
        }
        let asset = RemoteAsset {
            id,
            name: name.to_string(),
            size: content.len() as u64,
        };
        release.assets.push(asset.clone());
        state.contents.insert(id, content.to_vec());
        Ok(asset)
    }
}

pub fn spec(tag: &str) -> ReleaseSpec {
    ReleaseSpec {
        owner: "octo".to_string(),
        repo: "hello".to_string(),
        tag: tag.to_string(),
        draft: false,
        prerelease: false,
        title: format!("Release {}", tag),
        note: "notes".to_string(),
        overwrite: false,
        pickup_draft: false,
        file_exists: FileExistsPolicy::Overwrite,
        files: Vec::<PathBuf>::new(),
        checksum: ChecksumOptions::default(),
    }
}

pub fn repo() -> RepoRef {
    RepoRef::new("octo", "hello")
}
