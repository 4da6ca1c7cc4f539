//! Deploy run orchestration.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::context::RunContext;
use crate::deploy::{DeployRequest, Deployer};
use crate::error::RunError;
use crate::inputs::{ActionInputs, Credentials};
use crate::notify::{Connector, FailureDetails, NotificationRouter, SuccessDetails};
use crate::url::resolve_api_url;

/// Placeholder reported for values that were never resolved.
pub const UNKNOWN: &str = "unknown";

/// Process-level result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Whether the process should exit successfully.
    pub exit_success: bool,

    /// Raw deploy API response, exported as the `response` output.
    pub output: Option<String>,

    /// Failure reason shown by the CI platform.
    pub failure_message: Option<String>,
}

impl ProcessResult {
    fn succeeded(output: String) -> Self {
        Self {
            exit_success: true,
            output: Some(output),
            failure_message: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            exit_success: false,
            output: None,
            failure_message: Some(message),
        }
    }
}

/// Values resolved so far; used to fill the failure report.
#[derive(Debug, Default)]
struct Resolved {
    image: Option<String>,
    api_url: Option<String>,
}

/// One deploy run: validate inputs, call the deploy API once, report the outcome.
pub struct DeployRun {
    deployer: Arc<dyn Deployer>,
    connector: Box<Connector>,
    context: RunContext,
}

impl DeployRun {
    pub fn new(deployer: Arc<dyn Deployer>, connector: Box<Connector>, context: RunContext) -> Self {
        Self {
            deployer,
            connector,
            context,
        }
    }

    /// Execute the run, resolving platform credentials from `inputs`.
    pub async fn run(&self, inputs: &ActionInputs) -> ProcessResult {
        let credentials = inputs.credentials();
        self.run_with_credentials(inputs, &credentials).await
    }

    /// Execute the run with explicit platform credentials.
    ///
    /// Exactly one of the success or failure paths executes. Notification
    /// errors are logged and never change the result.
    pub async fn run_with_credentials(
        &self,
        inputs: &ActionInputs,
        credentials: &Credentials,
    ) -> ProcessResult {
        let mut resolved = Resolved::default();
        let router = NotificationRouter::new(credentials, &*self.connector, &self.context);

        match self.deploy(inputs, &mut resolved).await {
            Ok(response_body) => {
                info!("Deploy succeeded");
                let details = SuccessDetails {
                    api_url: resolved.api_url.as_deref().unwrap_or(UNKNOWN),
                    image: resolved.image.as_deref().unwrap_or(UNKNOWN),
                };
                if let Err(e) = router.notify_success(&details).await {
                    warn!(error = %e, "Failed to post success comment");
                }
                ProcessResult::succeeded(response_body)
            }
            Err(run_error) => {
                error!(error = %run_error, "Deploy run failed");
                let fallback_url = inputs.raw_base_url();
                let details = FailureDetails {
                    api_url: resolved
                        .api_url
                        .as_deref()
                        .or(fallback_url.as_deref())
                        .unwrap_or(UNKNOWN),
                    image: resolved.image.as_deref().unwrap_or(UNKNOWN),
                    error: &run_error,
                };
                if let Err(e) = router.notify_failure(&details).await {
                    warn!(error = %e, "Could not create failure issue");
                }
                ProcessResult::failed(run_error.to_string())
            }
        }
    }

    async fn deploy(
        &self,
        inputs: &ActionInputs,
        resolved: &mut Resolved,
    ) -> Result<String, RunError> {
        let token = inputs.token()?;
        let image = inputs.image()?;
        resolved.image = Some(image.clone());
        let base_url = inputs.base_url()?;

        let api_url = resolve_api_url(Some(&base_url))?;
        resolved.api_url = Some(api_url.clone());
        let timeout = inputs.timeout()?;

        info!(image = %image, "Triggering deploy via {}", api_url);
        let request = DeployRequest::new(api_url, token, image).with_timeout(timeout);
        self.deployer.invoke(&request).await.into_result()
    }
}
