//! Outcome reporting to the collaboration platform.
//!
//! Success is announced on the most specific target the run context offers
//! (release, then pull request, then commit). Failure always opens an issue.
//! Both entry points return a [`NotifyResult`]; nothing here can fail a run.

use std::sync::Arc;

use tracing::{info, warn};

use crate::context::{NotificationTarget, RepoRef, RunContext};
use crate::error::{NotificationError, NotifyResult, RunError};
use crate::inputs::Credentials;
use crate::platform::Collaboration;

/// Builds a platform client for a token.
pub type Connector = dyn Fn(&str) -> NotifyResult<Arc<dyn Collaboration>> + Send + Sync;

/// What a notification call achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Success note appended to a release body.
    Release { id: u64 },
    /// Comment posted on a pull request.
    PullRequestComment { number: u64 },
    /// Comment posted on a commit.
    CommitComment { sha: String },
    /// Failure issue opened.
    Issue { number: u64 },
    /// Nothing to post on.
    NoTarget,
    /// No platform token was available.
    NoCredentials,
}

/// Details of a successful deploy.
#[derive(Debug, Clone, Copy)]
pub struct SuccessDetails<'a> {
    pub api_url: &'a str,
    pub image: &'a str,
}

/// Details of a failed run.
#[derive(Debug, Clone, Copy)]
pub struct FailureDetails<'a> {
    pub api_url: &'a str,
    pub image: &'a str,
    pub error: &'a RunError,
}

/// Render the success note.
pub fn success_message(details: &SuccessDetails<'_>) -> String {
    [
        format!("✅ Coswarm deploy succeeded for {}", details.image),
        String::new(),
        format!("**API URL:** {}", details.api_url),
        format!("**Image:** {}", details.image),
    ]
    .join("\n")
}

/// Title of the failure issue.
pub fn failure_issue_title(image: &str) -> String {
    format!("Coswarm deploy failed for {}", image)
}

/// Render the failure issue body.
///
/// The raw response body, when there is one, goes into a collapsible block.
pub fn failure_issue_body(details: &FailureDetails<'_>) -> String {
    let response_section = details
        .error
        .response_body()
        .filter(|body| !body.is_empty())
        .map(|body| {
            [
                "<details>",
                "<summary>Response body</summary>",
                "",
                "```",
                body,
                "```",
                "</details>",
            ]
            .join("\n")
        });

    let lines = [
        Some("The Coswarm deployment API call failed.".to_string()),
        Some(format!("**API URL:** {}", details.api_url)),
        Some(format!("**Image:** {}", details.image)),
        Some(format!("**Status:** {}", details.error)),
        response_section,
        Some("Please investigate the deployment service.".to_string()),
    ];

    lines.into_iter().flatten().collect::<Vec<_>>().join("\n")
}

/// Routes run outcomes to the collaboration platform.
pub struct NotificationRouter<'a> {
    credentials: &'a Credentials,
    connector: &'a Connector,
    context: &'a RunContext,
}

impl<'a> NotificationRouter<'a> {
    pub fn new(credentials: &'a Credentials, connector: &'a Connector, context: &'a RunContext) -> Self {
        Self {
            credentials,
            connector,
            context,
        }
    }

    fn repository(&self) -> NotifyResult<&RepoRef> {
        self.context
            .repository
            .as_ref()
            .ok_or(NotificationError::MissingRepository)
    }

    /// Announce a successful deploy.
    ///
    /// Tries release, pull request and commit in that order. A failing channel
    /// is logged and the next one tried; the last failure is returned.
    pub async fn notify_success(&self, details: &SuccessDetails<'_>) -> NotifyResult<Delivery> {
        let Some(token) = self.credentials.github_token() else {
            info!("No GitHub token available to post success comment.");
            return Ok(Delivery::NoCredentials);
        };

        let platform = (self.connector)(token)?;
        let repo = self.repository()?;
        let message = success_message(details);

        let mut targets = self.context.notification_targets().into_iter().peekable();
        while let Some(target) = targets.next() {
            let has_fallback = targets.peek().is_some();
            match post_success(platform.as_ref(), repo, &target, &message).await {
                Ok(delivery) => {
                    info!(?delivery, "Posted success notification");
                    return Ok(delivery);
                }
                Err(e) if has_fallback => {
                    warn!(?target, error = %e, "Could not post success notification; trying next target");
                }
                Err(e) => return Err(e),
            }
        }

        info!("No suitable target found to post success comment; skipping.");
        Ok(Delivery::NoTarget)
    }

    /// Open an issue describing a failed run.
    pub async fn notify_failure(&self, details: &FailureDetails<'_>) -> NotifyResult<Delivery> {
        let Some(token) = self.credentials.github_token() else {
            warn!("No GitHub token available to create a failure issue.");
            return Ok(Delivery::NoCredentials);
        };

        let platform = (self.connector)(token)?;
        let repo = self.repository()?;

        let issue = platform
            .create_issue(
                repo,
                &failure_issue_title(details.image),
                &failure_issue_body(details),
            )
            .await?;

        info!(
            number = issue.number,
            url = issue.html_url.as_deref().unwrap_or_default(),
            "Opened failure issue"
        );
        Ok(Delivery::Issue {
            number: issue.number,
        })
    }
}

async fn post_success(
    platform: &dyn Collaboration,
    repo: &RepoRef,
    target: &NotificationTarget,
    message: &str,
) -> NotifyResult<Delivery> {
    match target {
        NotificationTarget::Release { tag } => {
            let release = platform.get_release_by_tag(repo, tag).await?;
            let body = format!("{}\n\n{}", release.body.as_deref().unwrap_or_default(), message);
            platform.update_release(repo, release.id, &body).await?;
            Ok(Delivery::Release { id: release.id })
        }
        NotificationTarget::PullRequest { number } => {
            platform
                .create_pull_request_comment(repo, *number, message)
                .await?;
            Ok(Delivery::PullRequestComment { number: *number })
        }
        NotificationTarget::Commit { sha } => {
            platform.create_commit_comment(repo, sha, message).await?;
            Ok(Delivery::CommitComment { sha: sha.clone() })
        }
    }
}
