//! Event metadata supplied by the CI platform.

use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// `owner/repo` pair identifying the repository that triggered the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parse `owner/repo`. Anything else yields `None`.
    pub fn parse(slug: &str) -> Option<Self> {
        let (owner, name) = slug.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(RepoRef {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Read-only metadata about the event that triggered the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    pub repository: Option<RepoRef>,
    pub sha: Option<String>,
    pub release_tag: Option<String>,
    pub pull_request_number: Option<u64>,
}

/// Where a success notification can be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationTarget {
    Release { tag: String },
    PullRequest { number: u64 },
    Commit { sha: String },
}

/// Subset of the webhook payload we care about.
#[derive(Debug, Default, Deserialize)]
struct EventPayload {
    #[serde(default)]
    release: Option<ReleasePayload>,
    #[serde(default)]
    pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Deserialize)]
struct ReleasePayload {
    #[serde(default)]
    tag_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    #[serde(default)]
    number: Option<u64>,
}

impl RunContext {
    /// Build the context from the GitHub Actions environment.
    ///
    /// Reads `GITHUB_REPOSITORY`, `GITHUB_SHA` and the payload at
    /// `GITHUB_EVENT_PATH`. An unreadable payload is logged and treated as empty.
    pub fn from_env() -> Self {
        let repository = std::env::var("GITHUB_REPOSITORY").ok();
        let sha = std::env::var("GITHUB_SHA").ok();
        let payload = match std::env::var("GITHUB_EVENT_PATH") {
            Ok(path) if !path.is_empty() => read_payload(Path::new(&path)),
            _ => String::new(),
        };

        Self::from_parts(repository.as_deref(), sha.as_deref(), &payload)
    }

    /// Build the context from raw values.
    pub fn from_parts(repository: Option<&str>, sha: Option<&str>, payload: &str) -> Self {
        let event: EventPayload = if payload.trim().is_empty() {
            EventPayload::default()
        } else {
            serde_json::from_str(payload).unwrap_or_else(|e| {
                warn!(error = %e, "Could not parse event payload; ignoring it");
                EventPayload::default()
            })
        };

        RunContext {
            repository: repository.and_then(RepoRef::parse),
            sha: sha.filter(|s| !s.is_empty()).map(str::to_string),
            release_tag: event
                .release
                .and_then(|r| r.tag_name)
                .filter(|t| !t.is_empty()),
            pull_request_number: event
                .pull_request
                .and_then(|pr| pr.number)
                .filter(|n| *n != 0),
        }
    }

    /// Success-notification targets in priority order: release, pull request, commit.
    pub fn notification_targets(&self) -> Vec<NotificationTarget> {
        let mut targets = Vec::new();
        if let Some(tag) = &self.release_tag {
            targets.push(NotificationTarget::Release { tag: tag.clone() });
        }
        if let Some(number) = self.pull_request_number {
            targets.push(NotificationTarget::PullRequest { number });
        }
        if let Some(sha) = &self.sha {
            targets.push(NotificationTarget::Commit { sha: sha.clone() });
        }
        targets
    }
}

fn read_payload(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Event payload not readable");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_repo_ref_parse() {
        let repo = RepoRef::parse("coswarm/api").unwrap();
        assert_eq!(repo.owner, "coswarm");
        assert_eq!(repo.name, "api");
        assert_eq!(repo.to_string(), "coswarm/api");
    }

    #[test]
    fn test_repo_ref_parse_invalid() {
        assert!(RepoRef::parse("no-slash").is_none());
        assert!(RepoRef::parse("/repo").is_none());
        assert!(RepoRef::parse("owner/").is_none());
        assert!(RepoRef::parse("a/b/c").is_none());
    }

    #[test]
    fn test_release_payload() {
        let ctx = RunContext::from_parts(
            Some("o/r"),
            Some("abc123"),
            r#"{"action":"published","release":{"id":7,"tag_name":"v1.2.0"}}"#,
        );
        assert_eq!(ctx.release_tag.as_deref(), Some("v1.2.0"));
        assert_eq!(ctx.pull_request_number, None);
        assert_eq!(
            ctx.notification_targets().into_iter().next(),
            Some(NotificationTarget::Release {
                tag: "v1.2.0".to_string()
            })
        );
    }

    #[test]
    fn test_pull_request_payload() {
        let ctx = RunContext::from_parts(
            Some("o/r"),
            Some("abc123"),
            r#"{"action":"opened","number":42,"pull_request":{"number":42}}"#,
        );
        assert_eq!(ctx.pull_request_number, Some(42));
        assert_eq!(
            ctx.notification_targets(),
            vec![
                NotificationTarget::PullRequest { number: 42 },
                NotificationTarget::Commit {
                    sha: "abc123".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_targets_order() {
        let ctx = RunContext {
            repository: None,
            sha: Some("abc".to_string()),
            release_tag: Some("v1".to_string()),
            pull_request_number: Some(3),
        };
        let targets = ctx.notification_targets();
        assert!(matches!(targets[0], NotificationTarget::Release { .. }));
        assert!(matches!(targets[1], NotificationTarget::PullRequest { .. }));
        assert!(matches!(targets[2], NotificationTarget::Commit { .. }));
    }

    #[test]
    fn test_empty_context_has_no_targets() {
        let ctx = RunContext::from_parts(None, None, "");
        assert!(ctx.notification_targets().is_empty());
        assert!(ctx.repository.is_none());
    }

    #[test]
    fn test_malformed_payload_is_ignored() {
        let ctx = RunContext::from_parts(Some("o/r"), Some("abc"), "{not json");
        assert!(ctx.release_tag.is_none());
        assert_eq!(ctx.sha.as_deref(), Some("abc"));
    }

    #[test]
    fn test_read_payload_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"release":{{"tag_name":"v9"}}}}"#).unwrap();

        let payload = read_payload(file.path());
        let ctx = RunContext::from_parts(Some("o/r"), None, &payload);
        assert_eq!(ctx.release_tag.as_deref(), Some("v9"));
    }

    #[test]
    fn test_read_missing_payload_file() {
        let payload = read_payload(Path::new("/definitely/not/here/event.json"));
        assert!(payload.is_empty());
    }
}
