//! Typed view of the step's inputs.

use std::time::Duration;

use crate::error::RunError;

/// Environment variable consulted when no `github-token` input is given.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Raw inputs as supplied by the CI environment or command line.
///
/// Values are trimmed; empty values count as missing.
#[derive(Debug, Clone, Default)]
pub struct ActionInputs {
    pub token: Option<String>,
    pub image: Option<String>,
    pub base_url: Option<String>,
    pub github_token: Option<String>,
    pub timeout_secs: Option<String>,
}

impl ActionInputs {
    /// Deploy API token.
    pub fn token(&self) -> Result<String, RunError> {
        required("token", &self.token)
    }

    /// Image reference to deploy.
    pub fn image(&self) -> Result<String, RunError> {
        required("image", &self.image)
    }

    /// Deploy service base URL.
    pub fn base_url(&self) -> Result<String, RunError> {
        required("base-url", &self.base_url)
    }

    /// Base URL as given, without the required check.
    pub fn raw_base_url(&self) -> Option<String> {
        non_empty(&self.base_url)
    }

    /// Optional deploy request timeout. Unset or `0` means no explicit timeout.
    pub fn timeout(&self) -> Result<Option<Duration>, RunError> {
        match non_empty(&self.timeout_secs) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<u64>()
                .map(|secs| (secs > 0).then(|| Duration::from_secs(secs)))
                .map_err(|_| {
                    RunError::Configuration(format!(
                        "inputs.timeout-secs must be a whole number of seconds, got '{}'",
                        raw
                    ))
                }),
        }
    }

    /// Resolve GitHub credentials from the input, then [`GITHUB_TOKEN_ENV`].
    pub fn credentials(&self) -> Credentials {
        Credentials::resolve(
            self.github_token.as_deref(),
            std::env::var(GITHUB_TOKEN_ENV).ok().as_deref(),
        )
    }
}

/// Credentials for the collaboration platform.
///
/// Populated once by the orchestrator and handed to the notification router.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    github_token: Option<String>,
}

impl Credentials {
    /// Pick the first non-empty token from `primary`, then `fallback`.
    pub fn resolve(primary: Option<&str>, fallback: Option<&str>) -> Self {
        let github_token = [primary, fallback]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|token| !token.is_empty())
            .map(str::to_string);

        Credentials { github_token }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("github_token", &self.github_token.as_ref().map(|_| "***"))
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(name: &str, value: &Option<String>) -> Result<String, RunError> {
    non_empty(value).ok_or_else(|| {
        RunError::Configuration(format!("Input required and not supplied: {}", name))
    })
}
