use async_trait::async_trait;
use bytes::Bytes;
use hyper::{Method, Uri};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::data::{NewRelease, ReleaseEdit, RemoteAsset, RemoteRelease, RepoRef};
use crate::error::{Result, ServiceError};
use crate::service::{Lookup, ReleaseService};

use publisher_utils::{http::request, CallContext, ResponseData};

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_UPLOAD_URL: &str = "https://uploads.github.com";

const USER_AGENT: &str = "release-publisher";
const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;

/// GitHub REST implementation of [`ReleaseService`]
pub struct GitHubReleaseService {
    api_url: String,
    upload_url: String,
    token: String,
}

impl GitHubReleaseService {
    pub fn new(token: impl Into<String>) -> Self {
        GitHubReleaseService {
            api_url: GITHUB_API_URL.to_string(),
            upload_url: GITHUB_UPLOAD_URL.to_string(),
            token: token.into(),
        }
    }

    /// Point API calls elsewhere, e.g. a GitHub Enterprise `/api/v3` root
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_upload_url(mut self, upload_url: &str) -> Self {
        self.upload_url = upload_url.trim_end_matches('/').to_string();
        self
    }

    fn get_header_map(&self, content_type: Option<&str>) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("User-Agent".to_string(), USER_AGENT.to_string());
        map.insert("Accept".to_string(), ACCEPT.to_string());
        map.insert("X-GitHub-Api-Version".to_string(), API_VERSION.to_string());
        // blank tokens fall back to anonymous access
        if !self.token.trim().is_empty() {
            map.insert(
                "Authorization".to_string(),
                format!("Bearer {}", self.token.trim()),
            );
        }
        if let Some(content_type) = content_type {
            map.insert("Content-Type".to_string(), content_type.to_string());
        }
        map
    }

    fn repo_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_url,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.repo)
        )
    }

    async fn call(
        &self,
        ctx: &CallContext,
        method: Method,
        url: String,
        body: Option<Bytes>,
        content_type: Option<&str>,
    ) -> Result<Bytes> {
        let uri = url
            .parse::<Uri>()
            .map_err(|e| ServiceError::InvalidRequest(format!("{}: {}", url, e)))?;
        let header_map = self.get_header_map(content_type);
        let rsp = ctx
            .run(request(method, uri, &header_map, body))
            .await?
            .map_err(ServiceError::Transport)?;

        if rsp.is_ok() {
            Ok(rsp.body.unwrap_or_default())
        } else if rsp.status == 404 {
            Err(ServiceError::NotFound(url))
        } else {
            Err(ServiceError::Status {
                status: rsp.status,
                message: api_message(&rsp),
            })
        }
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        method: Method,
        url: String,
        body: Option<Bytes>,
    ) -> Result<T> {
        let content_type = body.as_ref().map(|_| "application/json");
        let rsp_body = self.call(ctx, method, url, body, content_type).await?;
        Ok(serde_json::from_slice(&rsp_body)?)
    }

    /// Walks `?page=N` until a short page, preserving the remote order
    async fn get_paged<T: DeserializeOwned>(&self, ctx: &CallContext, url: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let page_url = format!("{}?per_page={}&page={}", url, PER_PAGE, page);
            let batch: Vec<T> = self.call_json(ctx, Method::GET, page_url, None).await?;
            let count = batch.len();
            debug!("Fetched page {} of {} ({} items)", page, url, count);
            items.extend(batch);
            if count < PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

fn api_message(rsp: &ResponseData) -> String {
    rsp.body
        .as_ref()
        .and_then(|body| serde_json::from_slice::<Value>(body).ok())
        .and_then(|json| json.get("message")?.as_str().map(|s| s.to_string()))
        .unwrap_or_else(|| rsp.body_text())
}

#[async_trait]
impl ReleaseService for GitHubReleaseService {
    async fn list_releases(&self, ctx: &CallContext, repo: &RepoRef) -> Result<Vec<RemoteRelease>> {
        let url = format!("{}/releases", self.repo_url(repo));
        self.get_paged(ctx, &url).await
    }

    async fn get_release(
        &self,
        ctx: &CallContext,
        repo: &RepoRef,
        id: u64,
    ) -> Result<RemoteRelease> {
        let url = format!("{}/releases/{}", self.repo_url(repo), id);
        self.call_json(ctx, Method::GET, url, None).await
    }

    async fn get_release_by_tag(
        &self,
        ctx: &CallContext,
        repo: &RepoRef,
        tag: &str,
    ) -> Lookup<RemoteRelease> {
        let url = format!(
            "{}/releases/tags/{}",
            self.repo_url(repo),
            urlencoding::encode(tag)
        );
        Lookup::from_result(self.call_json(ctx, Method::GET, url, None).await)
    }

    async fn create_release(
        &self,
        ctx: &CallContext,
        repo: &RepoRef,
        release: &NewRelease,
    ) -> Result<RemoteRelease> {
        let url = format!("{}/releases", self.repo_url(repo));
        let body = Bytes::from(serde_json::to_vec(release)?);
        self.call_json(ctx, Method::POST, url, Some(body)).await
    }

    async fn edit_release(
        &self,
        ctx: &CallContext,
        repo: &RepoRef,
        id: u64,
        edit: &ReleaseEdit,
    ) -> Result<RemoteRelease> {
        let url = format!("{}/releases/{}", self.repo_url(repo), id);
        let body = Bytes::from(serde_json::to_vec(edit)?);
        self.call_json(ctx, Method::PATCH, url, Some(body)).await
    }

    async fn list_release_assets(
        &self,
        ctx: &CallContext,
        repo: &RepoRef,
        release_id: u64,
    ) -> Result<Vec<RemoteAsset>> {
        let url = format!("{}/releases/{}/assets", self.repo_url(repo), release_id);
        self.get_paged(ctx, &url).await
    }

    async fn delete_release_asset(
        &self,
        ctx: &CallContext,
        repo: &RepoRef,
        asset_id: u64,
    ) -> Result<()> {
        let url = format!("{}/releases/assets/{}", self.repo_url(repo), asset_id);
        self.call(ctx, Method::DELETE, url, None, None).await?;
        Ok(())
    }

    async fn upload_release_asset(
        &self,
        ctx: &CallContext,
        repo: &RepoRef,
        release_id: u64,
        name: &str,
        content: Bytes,
    ) -> Result<RemoteAsset> {
        let url = format!(
            "{}/repos/{}/{}/releases/{}/assets?name={}",
            self.upload_url,
            urlencoding::encode(&repo.owner),
            urlencoding::encode(&repo.repo),
            release_id,
            urlencoding::encode(name)
        );
        let rsp_body = self
            .call(
                ctx,
                Method::POST,
                url,
                Some(content),
                Some("application/octet-stream"),
            )
            .await?;
        Ok(serde_json::from_slice(&rsp_body)?)
    }
}
