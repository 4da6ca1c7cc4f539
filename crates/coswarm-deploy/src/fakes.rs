//! In-memory fake for the collaboration platform (testing only)
//!
//! `MemoryCollaboration` records every call and can be told to fail
//! individual operations.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::context::RepoRef;
use crate::error::{NotificationError, NotifyResult};
use crate::platform::{Collaboration, CreatedIssue, Release};

/// Platform operations, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateIssue,
    CreatePullRequestComment,
    CreateCommitComment,
    GetReleaseByTag,
    UpdateRelease,
}

/// A recorded platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    CreateIssue {
        repo: String,
        title: String,
        body: String,
    },
    CreatePullRequestComment {
        repo: String,
        number: u64,
        body: String,
    },
    CreateCommitComment {
        repo: String,
        sha: String,
        body: String,
    },
    GetReleaseByTag {
        repo: String,
        tag: String,
    },
    UpdateRelease {
        repo: String,
        release_id: u64,
        body: String,
    },
}

impl PlatformCall {
    pub fn operation(&self) -> Operation {
        match self {
            PlatformCall::CreateIssue { .. } => Operation::CreateIssue,
            PlatformCall::CreatePullRequestComment { .. } => Operation::CreatePullRequestComment,
            PlatformCall::CreateCommitComment { .. } => Operation::CreateCommitComment,
            PlatformCall::GetReleaseByTag { .. } => Operation::GetReleaseByTag,
            PlatformCall::UpdateRelease { .. } => Operation::UpdateRelease,
        }
    }
}

/// In-memory collaboration platform.
#[derive(Debug, Default)]
pub struct MemoryCollaboration {
    releases: Mutex<HashMap<String, Release>>,
    failing: Mutex<HashSet<Operation>>,
    calls: Mutex<Vec<PlatformCall>>,
    next_issue: Mutex<u64>,
}

impl MemoryCollaboration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a release that `get_release_by_tag` can find.
    pub fn with_release(self, tag: &str, id: u64, body: Option<&str>) -> Self {
        self.releases.lock().unwrap().insert(
            tag.to_string(),
            Release {
                id,
                body: body.map(str::to_string),
            },
        );
        self
    }

    /// Make every call to `operation` fail.
    pub fn failing(self, operation: Operation) -> Self {
        self.failing.lock().unwrap().insert(operation);
        self
    }

    /// All calls in the order they were made.
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made for `operation`.
    pub fn count(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Current body of the release registered under `tag`.
    pub fn release_body(&self, tag: &str) -> Option<String> {
        self.releases
            .lock()
            .unwrap()
            .get(tag)
            .and_then(|r| r.body.clone())
    }

    fn record(&self, call: PlatformCall) -> NotifyResult<()> {
        let operation = call.operation();
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(&operation) {
            return Err(NotificationError::Api {
                status: 500,
                message: format!("injected failure for {:?}", operation),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Collaboration for MemoryCollaboration {
    async fn create_issue(
        &self,
        repo: &RepoRef,
        title: &str,
        body: &str,
    ) -> NotifyResult<CreatedIssue> {
        self.record(PlatformCall::CreateIssue {
            repo: repo.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        })?;
        let mut next = self.next_issue.lock().unwrap();
        *next += 1;
        Ok(CreatedIssue {
            number: *next,
            html_url: None,
        })
    }

    async fn create_pull_request_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> NotifyResult<()> {
        self.record(PlatformCall::CreatePullRequestComment {
            repo: repo.to_string(),
            number,
            body: body.to_string(),
        })
    }

    async fn create_commit_comment(
        &self,
        repo: &RepoRef,
        sha: &str,
        body: &str,
    ) -> NotifyResult<()> {
        self.record(PlatformCall::CreateCommitComment {
            repo: repo.to_string(),
            sha: sha.to_string(),
            body: body.to_string(),
        })
    }

    async fn get_release_by_tag(&self, repo: &RepoRef, tag: &str) -> NotifyResult<Release> {
        self.record(PlatformCall::GetReleaseByTag {
            repo: repo.to_string(),
            tag: tag.to_string(),
        })?;
        self.releases
            .lock()
            .unwrap()
            .get(tag)
            .cloned()
            .ok_or_else(|| NotificationError::Api {
                status: 404,
                message: "Not Found".to_string(),
            })
    }

    async fn update_release(
        &self,
        repo: &RepoRef,
        release_id: u64,
        body: &str,
    ) -> NotifyResult<()> {
        self.record(PlatformCall::UpdateRelease {
            repo: repo.to_string(),
            release_id,
            body: body.to_string(),
        })?;
        let mut releases = self.releases.lock().unwrap();
        if let Some(release) = releases.values_mut().find(|r| r.id == release_id) {
            release.body = Some(body.to_string());
            Ok(())
        } else {
            Err(NotificationError::Api {
                status: 404,
                message: "Not Found".to_string(),
            })
        }
    }
}
