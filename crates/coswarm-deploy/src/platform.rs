//! Collaboration platform operations used for outcome reporting.

use async_trait::async_trait;
use serde::Deserialize;

use crate::context::RepoRef;
use crate::error::NotifyResult;

/// A release as returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
}

/// An issue created by [`Collaboration::create_issue`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// The platform calls consumed by the notification router.
#[async_trait]
pub trait Collaboration: Send + Sync {
    /// Open a new issue.
    async fn create_issue(&self, repo: &RepoRef, title: &str, body: &str)
        -> NotifyResult<CreatedIssue>;

    /// Comment on a pull request.
    async fn create_pull_request_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> NotifyResult<()>;

    /// Comment on a commit.
    async fn create_commit_comment(&self, repo: &RepoRef, sha: &str, body: &str)
        -> NotifyResult<()>;

    /// Look up a release by its tag.
    async fn get_release_by_tag(&self, repo: &RepoRef, tag: &str) -> NotifyResult<Release>;

    /// Replace a release body.
    async fn update_release(&self, repo: &RepoRef, release_id: u64, body: &str)
        -> NotifyResult<()>;
}
