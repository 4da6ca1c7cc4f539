//! Coswarm Deploy - CI step entry point
//!
//! Triggers a Coswarm deployment for a container image and reports the
//! outcome to GitHub.
//!
//! ## Inputs
//!
//! Every input can be passed as a flag or through the environment variable
//! the Actions runner sets for it:
//!
//! - `--token` / `INPUT_TOKEN`: deploy API token (required)
//! - `--image` / `INPUT_IMAGE`: image reference (required)
//! - `--base-url` / `INPUT_BASE-URL`: deploy service base URL (required)
//! - `--github-token` / `INPUT_GITHUB-TOKEN`: GitHub token, falls back to `GITHUB_TOKEN`
//! - `--timeout-secs` / `INPUT_TIMEOUT-SECS`: optional deploy request timeout

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, Level};

use coswarm_deploy::{
    ActionInputs, Collaboration, Connector, DeployRun, Deployer, GitHubClient, HttpDeployer,
    NotifyResult, RunContext, UnavailableDeployer, WorkflowCommands,
};

#[derive(Parser)]
#[command(name = "coswarm-deploy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Trigger a Coswarm deployment and report the outcome to GitHub", long_about = None)]
struct Cli {
    /// Deploy API token
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Image reference to deploy (e.g. registry.example.com/app:1.0)
    #[arg(long, env = "INPUT_IMAGE")]
    image: Option<String>,

    /// Base URL of the Coswarm deploy service
    #[arg(long = "base-url", env = "INPUT_BASE-URL")]
    base_url: Option<String>,

    /// GitHub token used for issues and comments
    #[arg(long = "github-token", env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Deploy request timeout in seconds (no timeout when unset)
    #[arg(long = "timeout-secs", env = "INPUT_TIMEOUT-SECS")]
    timeout_secs: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn inputs(&self) -> ActionInputs {
        ActionInputs {
            token: self.token.clone(),
            image: self.image.clone(),
            base_url: self.base_url.clone(),
            github_token: self.github_token.clone(),
            timeout_secs: self.timeout_secs.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    coswarm_deploy::init_tracing(cli.json, level);

    let deployer: Arc<dyn Deployer> = match HttpDeployer::new() {
        Ok(deployer) => Arc::new(deployer),
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            Arc::new(UnavailableDeployer::new(format!(
                "Failed to build HTTP client: {}",
                e
            )))
        }
    };
    let connector: Box<Connector> =
        Box::new(|token: &str| -> NotifyResult<Arc<dyn Collaboration>> {
            Ok(Arc::new(GitHubClient::from_env(token)?))
        });

    let run = DeployRun::new(deployer, connector, RunContext::from_env());
    let result = run.run(&cli.inputs()).await;

    let commands = WorkflowCommands::from_env();
    let mut stdout = std::io::stdout();
    if let Some(output) = &result.output {
        commands
            .set_output(&mut stdout, "response", output)
            .context("Failed to write step output")?;
    }
    if let Some(message) = &result.failure_message {
        commands
            .set_failed(&mut stdout, message)
            .context("Failed to report failure")?;
    }

    Ok(if result.exit_success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
