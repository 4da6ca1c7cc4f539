//! Deploy request execution and outcome classification.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::error::RunError;

/// A single deploy request. Built once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Resolved deploy endpoint.
    pub api_url: String,

    /// Deploy API auth token.
    pub auth_token: String,

    /// Image reference to deploy.
    pub image: String,

    /// Request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl DeployRequest {
    pub fn new(api_url: String, auth_token: String, image: String) -> Self {
        Self {
            api_url,
            auth_token,
            image,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// JSON body sent to the deploy API.
#[derive(Debug, Serialize)]
struct DeployPayload<'a> {
    token: &'a str,
    image: &'a str,
}

/// Result of a deploy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// The deploy API answered with a 2xx status.
    Success { response_body: String },

    /// Non-2xx status or transport failure.
    Failure {
        status_message: String,
        /// Absent when no response was received.
        response_body: Option<String>,
    },
}

impl DeployOutcome {
    /// Classify a received response.
    pub fn from_response(status: StatusCode, body: String) -> Self {
        if status.is_success() {
            DeployOutcome::Success {
                response_body: body,
            }
        } else {
            DeployOutcome::Failure {
                status_message: format!(
                    "Deploy failed with status {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                ),
                response_body: Some(body),
            }
        }
    }

    /// Convert into the run-level result.
    pub fn into_result(self) -> Result<String, RunError> {
        match self {
            DeployOutcome::Success { response_body } => Ok(response_body),
            DeployOutcome::Failure {
                status_message,
                response_body,
            } => Err(RunError::Deploy {
                message: status_message,
                response_body,
            }),
        }
    }
}

/// Something that can perform the deploy call.
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Issue the deploy request exactly once. Never retries.
    async fn invoke(&self, request: &DeployRequest) -> DeployOutcome;
}

/// Deployer backed by an HTTP POST to the Coswarm deploy API.
pub struct HttpDeployer {
    http_client: reqwest::Client,
}

impl HttpDeployer {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("coswarm-deploy/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpDeployer { http_client })
    }
}

#[async_trait]
impl Deployer for HttpDeployer {
    async fn invoke(&self, request: &DeployRequest) -> DeployOutcome {
        let payload = DeployPayload {
            token: &request.auth_token,
            image: &request.image,
        };

        // `json` sets Content-Type: application/json
        let mut builder = self.http_client.post(&request.api_url).json(&payload);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                return DeployOutcome::Failure {
                    status_message: format!("Deploy request to {} failed: {}", request.api_url, e),
                    response_body: None,
                };
            }
        };

        let status = response.status();
        debug!(status = status.as_u16(), "Deploy API responded");

        match response.text().await {
            Ok(body) => DeployOutcome::from_response(status, body),
            Err(e) => DeployOutcome::Failure {
                status_message: format!(
                    "Failed to read deploy response (status {}): {}",
                    status.as_u16(),
                    e
                ),
                response_body: None,
            },
        }
    }
}

/// Stands in for a deployer that could not be constructed.
///
/// Every invocation fails with the setup error and no response body, so the
/// run still takes its failure path.
pub struct UnavailableDeployer {
    reason: String,
}

impl UnavailableDeployer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Deployer for UnavailableDeployer {
    async fn invoke(&self, _request: &DeployRequest) -> DeployOutcome {
        DeployOutcome::Failure {
            status_message: self.reason.clone(),
            response_body: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_2xx_is_success() {
        for code in 200..=299u16 {
            let status = StatusCode::from_u16(code).unwrap();
            let outcome = DeployOutcome::from_response(status, format!("body-{}", code));
            assert_eq!(
                outcome,
                DeployOutcome::Success {
                    response_body: format!("body-{}", code)
                }
            );
        }
    }

    #[test]
    fn test_non_2xx_is_failure_with_body() {
        for code in [100u16, 199, 300, 302, 400, 404, 418, 500, 503, 599] {
            let status = StatusCode::from_u16(code).unwrap();
            let outcome = DeployOutcome::from_response(status, "nope".to_string());
            match outcome {
                DeployOutcome::Failure {
                    status_message,
                    response_body,
                } => {
                    assert!(status_message.contains(&code.to_string()));
                    assert_eq!(response_body.as_deref(), Some("nope"));
                }
                other => panic!("expected failure for {}, got {:?}", code, other),
            }
        }
    }

    #[test]
    fn test_failure_message_includes_reason_phrase() {
        let outcome =
            DeployOutcome::from_response(StatusCode::SERVICE_UNAVAILABLE, "overloaded".to_string());
        let err = outcome.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Deploy failed with status 503: Service Unavailable"
        );
        assert_eq!(err.response_body(), Some("overloaded"));
    }

    #[test]
    fn test_payload_shape() {
        let payload = DeployPayload {
            token: "t",
            image: "app:1.0",
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"token": "t", "image": "app:1.0"}));
    }

    #[tokio::test]
    async fn test_connection_refused_is_failure_without_body() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let deployer = HttpDeployer::new().expect("client");
        let request = DeployRequest::new(
            format!("http://127.0.0.1:{}/api/v1/apps/deploy", port),
            "t".to_string(),
            "app:1.0".to_string(),
        );

        match deployer.invoke(&request).await {
            DeployOutcome::Failure {
                status_message,
                response_body,
            } => {
                assert!(status_message.starts_with("Deploy request to"));
                assert!(response_body.is_none());
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unavailable_deployer_fails_without_body() {
        let deployer = UnavailableDeployer::new("Failed to build HTTP client: tls");
        let request = DeployRequest::new(
            "https://example.com/api/v1/apps/deploy".to_string(),
            "t".to_string(),
            "app:1.0".to_string(),
        );

        let err = deployer.invoke(&request).await.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Failed to build HTTP client: tls");
        assert_eq!(err.response_body(), None);
    }
}
