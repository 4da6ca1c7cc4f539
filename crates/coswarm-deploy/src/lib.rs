//! Coswarm Deploy - trigger a Coswarm deployment from CI
//!
//! Provides a single-shot deploy step that:
//! - Resolves the deploy endpoint and POSTs the image reference once
//! - Exports the deploy API response as a step output
//! - Reports success on a release, pull request or commit
//! - Opens an issue when the run fails

pub mod context;
pub mod deploy;
pub mod error;
pub mod fakes;
pub mod github;
pub mod inputs;
pub mod notify;
pub mod orchestrator;
pub mod platform;
pub mod telemetry;
pub mod url;
pub mod workflow;

// Re-export key types
pub use context::{NotificationTarget, RepoRef, RunContext};
pub use deploy::{DeployOutcome, DeployRequest, Deployer, HttpDeployer, UnavailableDeployer};
pub use error::{NotificationError, NotifyResult, RunError};
pub use github::GitHubClient;
pub use inputs::{ActionInputs, Credentials};
pub use notify::{Connector, Delivery, NotificationRouter};
pub use orchestrator::{DeployRun, ProcessResult};
pub use platform::{Collaboration, CreatedIssue, Release};
pub use telemetry::init_tracing;
pub use url::resolve_api_url;
pub use workflow::WorkflowCommands;
