//! GitHub REST client
//!
//! Implements [`Collaboration`] against the GitHub REST API. The API base
//! defaults to `https://api.github.com` and follows `GITHUB_API_URL` when
//! running on GitHub Enterprise.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::context::RepoRef;
use crate::error::{NotificationError, NotifyResult};
use crate::platform::{Collaboration, CreatedIssue, Release};

/// Public GitHub API base.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";

/// Error body returned by the GitHub API
#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

/// GitHub client authenticated with a single token
pub struct GitHubClient {
    api_base: Url,
    token: String,
    http_client: reqwest::Client,
}

impl GitHubClient {
    /// Create a client for the given API base.
    pub fn new(api_url: &str, token: &str) -> NotifyResult<Self> {
        let api_base =
            Url::parse(api_url).map_err(|e| NotificationError::InvalidUrl(format!("{}: {}", api_url, e)))?;
        if api_base.cannot_be_a_base() {
            return Err(NotificationError::InvalidUrl(api_url.to_string()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("coswarm-deploy/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(GitHubClient {
            api_base,
            token: token.to_string(),
            http_client,
        })
    }

    /// Create a client using `GITHUB_API_URL`, or the public API.
    pub fn from_env(token: &str) -> NotifyResult<Self> {
        let api_url = std::env::var("GITHUB_API_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(&api_url, token)
    }

    /// `<base>/repos/<owner>/<repo>/<segments...>`, each segment percent-encoded.
    fn repo_url(&self, repo: &RepoRef, segments: &[&str]) -> NotifyResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| NotificationError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.name.as_str()])
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        debug!(%method, %url, "GitHub API request");
        self.http_client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> NotifyResult<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiMessage>(&text)
            .map(|m| m.message)
            .unwrap_or(text);
        Err(NotificationError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Collaboration for GitHubClient {
    async fn create_issue(
        &self,
        repo: &RepoRef,
        title: &str,
        body: &str,
    ) -> NotifyResult<CreatedIssue> {
        let url = self.repo_url(repo, &["issues"])?;
        let response = self
            .send(
                self.request(reqwest::Method::POST, url)
                    .json(&json!({ "title": title, "body": body })),
            )
            .await?;
        Ok(response.json().await?)
    }

    async fn create_pull_request_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> NotifyResult<()> {
        let number = number.to_string();
        let url = self.repo_url(repo, &["issues", &number, "comments"])?;
        self.send(self.request(reqwest::Method::POST, url).json(&json!({ "body": body })))
            .await?;
        Ok(())
    }

    async fn create_commit_comment(
        &self,
        repo: &RepoRef,
        sha: &str,
        body: &str,
    ) -> NotifyResult<()> {
        let url = self.repo_url(repo, &["commits", sha, "comments"])?;
        self.send(self.request(reqwest::Method::POST, url).json(&json!({ "body": body })))
            .await?;
        Ok(())
    }

    async fn get_release_by_tag(&self, repo: &RepoRef, tag: &str) -> NotifyResult<Release> {
        let url = self.repo_url(repo, &["releases", "tags", tag])?;
        let response = self.send(self.request(reqwest::Method::GET, url)).await?;
        Ok(response.json().await?)
    }

    async fn update_release(
        &self,
        repo: &RepoRef,
        release_id: u64,
        body: &str,
    ) -> NotifyResult<()> {
        let release_id = release_id.to_string();
        let url = self.repo_url(repo, &["releases", &release_id])?;
        self.send(self.request(reqwest::Method::PATCH, url).json(&json!({ "body": body })))
            .await?;
        Ok(())
    }
}
