//! Deploy endpoint resolution.

use crate::error::RunError;

/// Path of the deploy endpoint, relative to the service base URL.
pub const DEPLOY_PATH: &str = "/api/v1/apps/deploy";

/// Build the deploy endpoint from the configured base URL.
///
/// Trailing slashes are stripped before [`DEPLOY_PATH`] is appended.
/// An absent or empty base URL is a configuration error.
pub fn resolve_api_url(base_url: Option<&str>) -> Result<String, RunError> {
    let base_url = base_url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| RunError::Configuration("inputs.base-url must be provided.".to_string()))?;

    let normalized = base_url.trim_end_matches('/');
    Ok(format!("{}{}", normalized, DEPLOY_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_strips_trailing_slashes() {
        for slashes in 0..=5 {
            let base = format!("https://coswarm.example.com{}", "/".repeat(slashes));
            let url = resolve_api_url(Some(&base)).expect("resolve failed");
            assert_eq!(url, "https://coswarm.example.com/api/v1/apps/deploy");
        }
    }

    #[test]
    fn test_resolve_keeps_base_path() {
        let url = resolve_api_url(Some("https://example.com/coswarm/")).unwrap();
        assert_eq!(url, "https://example.com/coswarm/api/v1/apps/deploy");
    }

    #[test]
    fn test_resolve_missing_base_url() {
        let err = resolve_api_url(None).unwrap_err();
        assert_eq!(
            err,
            RunError::Configuration("inputs.base-url must be provided.".to_string())
        );
    }

    #[test]
    fn test_resolve_empty_base_url() {
        assert!(matches!(
            resolve_api_url(Some("")),
            Err(RunError::Configuration(_))
        ));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let first = resolve_api_url(Some("http://localhost:8080//")).unwrap();
        let second = resolve_api_url(Some("http://localhost:8080//")).unwrap();
        assert_eq!(first, second);
    }
}
