//! Siteverify exchange and verdict normalization.

use std::time::Duration;

use gatehouse_common::constants::error_codes::MISSING_INPUT_RESPONSE;
use gatehouse_common::{
    GateError, SiteverifyRequest, SiteverifyResponse, VerificationSecret, VerificationVerdict,
};
use thiserror::Error;

use super::token_fingerprint;
use crate::config::TurnstileConfig;

/// Failure to get a verdict out of the verification service.
///
/// These are distinct from a rejected token: the user may be fine, the
/// service is not.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Connection, TLS or body transfer failure
    #[error("siteverify request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// No answer within the configured timeout
    #[error("siteverify request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-2xx HTTP status
    #[error("siteverify returned HTTP {0}")]
    Status(u16),

    /// Body was not the expected JSON shape
    #[error("siteverify returned an unparseable body: {0}")]
    Malformed(String),
}

impl From<VerifyError> for GateError {
    fn from(err: VerifyError) -> Self {
        GateError::ServiceUnavailable(err.to_string())
    }
}

/// Turnstile token validator.
///
/// Holds the deployment secret and a pooled HTTP client. Stateless between
/// calls, so a single instance is shared across all requests.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    client: reqwest::Client,
    endpoint: String,
    secret: VerificationSecret,
    timeout: Duration,
}

impl TokenValidator {
    /// Build a validator, failing if the secret is missing or the client
    /// cannot be constructed
    pub fn new(config: &TurnstileConfig) -> Result<Self, GateError> {
        let secret = config.secret()?;
        let timeout = Duration::from_secs(config.timeout_secs);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gatehouse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GateError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.siteverify_url.clone(),
            secret,
            timeout,
        })
    }

    /// Verify a submitted token.
    ///
    /// An absent or blank token is rejected locally with
    /// `missing-input-response`, the same code siteverify reports for it.
    /// Any other token costs exactly one POST to the endpoint.
    pub async fn validate(&self, token: Option<&str>) -> Result<VerificationVerdict, VerifyError> {
        let token = match token {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                tracing::debug!("Empty Turnstile token, rejecting without siteverify call");
                return Ok(VerificationVerdict::rejected(Some(
                    MISSING_INPUT_RESPONSE.to_string(),
                )));
            }
        };

        let fingerprint = token_fingerprint(token);
        let body = SiteverifyRequest {
            response: token,
            secret: self.secret.expose(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                token = %fingerprint,
                status = status.as_u16(),
                "Siteverify returned non-success status"
            );
            return Err(VerifyError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        let parsed: SiteverifyResponse = serde_json::from_slice(&bytes)
            .map_err(|e| VerifyError::Malformed(e.to_string()))?;

        if parsed.success && !parsed.error_codes.is_empty() {
            tracing::warn!(
                token = %fingerprint,
                error_codes = ?parsed.error_codes,
                "Siteverify reported success with error codes, ignoring codes"
            );
        }

        tracing::debug!(
            token = %fingerprint,
            action = ?parsed.action,
            hostname = ?parsed.hostname,
            challenge_ts = ?parsed.challenge_time(),
            "Siteverify response received"
        );

        let verdict = VerificationVerdict::from(parsed);

        if verdict.success() {
            tracing::info!(token = %fingerprint, "Turnstile token verified");
        } else {
            tracing::info!(
                token = %fingerprint,
                error_code = ?verdict.error_code(),
                "Turnstile token rejected"
            );
        }

        Ok(verdict)
    }

    fn classify(&self, err: reqwest::Error) -> VerifyError {
        if err.is_timeout() {
            VerifyError::Timeout(self.timeout)
        } else {
            VerifyError::Transport(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_common::ActionOutcome;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SITEVERIFY_PATH: &str = "/turnstile/v0/siteverify";

    fn config_for(endpoint: String, timeout_secs: u64) -> TurnstileConfig {
        TurnstileConfig {
            secret_key: Some("S1".to_string()),
            siteverify_url: endpoint,
            timeout_secs,
            ..Default::default()
        }
    }

    fn validator_for(server: &MockServer) -> TokenValidator {
        let endpoint = format!("{}{}", server.uri(), SITEVERIFY_PATH);
        TokenValidator::new(&config_for(endpoint, 2)).unwrap()
    }

    async fn mount_reply(server: &MockServer, token: &str, reply: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(SITEVERIFY_PATH))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"response": token, "secret": "S1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply))
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_missing_secret_fails_fast() {
        let config = TurnstileConfig::default();
        assert!(matches!(TokenValidator::new(&config), Err(GateError::Config(_))));
    }

    #[tokio::test]
    async fn test_valid_token() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            "valid-token-123",
            json!({"success": true, "error-codes": [], "action": "submit", "cdata": "x"}),
        )
        .await;

        let verdict = validator_for(&server)
            .validate(Some("valid-token-123"))
            .await
            .unwrap();

        assert!(verdict.success());
        assert_eq!(verdict.error_code(), None);
        assert_eq!(verdict.into_outcome(), ActionOutcome::granted());
    }

    #[tokio::test]
    async fn test_rejected_token_reports_first_code() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            "bad-token",
            json!({"success": false, "error-codes": ["invalid-input-response", "timeout-or-duplicate"]}),
        )
        .await;

        let verdict = validator_for(&server)
            .validate(Some("bad-token"))
            .await
            .unwrap();

        assert!(!verdict.success());
        assert_eq!(verdict.error_code(), Some("invalid-input-response"));
    }

    #[tokio::test]
    async fn test_rejected_token_without_codes() {
        let server = MockServer::start().await;
        mount_reply(&server, "bad-token", json!({"success": false, "error-codes": []})).await;

        let verdict = validator_for(&server)
            .validate(Some("bad-token"))
            .await
            .unwrap();

        assert!(!verdict.success());
        assert_eq!(verdict.error_code(), None);
        assert_eq!(verdict.into_outcome(), ActionOutcome::denied("Invalid CAPTCHA"));
    }

    #[tokio::test]
    async fn test_rejection_with_odd_extra_fields_is_a_verdict() {
        let server = MockServer::start().await;
        mount_reply(
            &server,
            "bad-token",
            json!({
                "success": false,
                "error-codes": ["invalid-input-response"],
                "challenge_ts": "",
                "cdata": {"k": 1}
            }),
        )
        .await;

        let verdict = validator_for(&server)
            .validate(Some("bad-token"))
            .await
            .unwrap();

        assert!(!verdict.success());
        assert_eq!(verdict.error_code(), Some("invalid-input-response"));
    }

    #[tokio::test]
    async fn test_missing_or_empty_token_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let validator = validator_for(&server);
        for token in [None, Some(""), Some("   ")] {
            let verdict = validator.validate(token).await.unwrap();
            assert!(!verdict.success());
            assert_eq!(verdict.error_code(), Some("missing-input-response"));
        }
    }

    #[tokio::test]
    async fn test_server_error_is_service_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SITEVERIFY_PATH))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let result = validator_for(&server).validate(Some("valid-token-123")).await;
        assert!(matches!(result, Err(VerifyError::Status(502))));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SITEVERIFY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = validator_for(&server).validate(Some("valid-token-123")).await;
        assert!(matches!(result, Err(VerifyError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_missing_success_field_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SITEVERIFY_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error-codes": []})))
            .mount(&server)
            .await;

        let result = validator_for(&server).validate(Some("valid-token-123")).await;
        assert!(matches!(result, Err(VerifyError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        // Grab a free port, then close it so the connection is refused
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = format!("http://{}{}", addr, SITEVERIFY_PATH);
        let validator = TokenValidator::new(&config_for(endpoint, 2)).unwrap();

        let err = validator.validate(Some("valid-token-123")).await.unwrap_err();
        assert!(matches!(err, VerifyError::Transport(_)));
        assert!(matches!(GateError::from(err), GateError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SITEVERIFY_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let endpoint = format!("{}{}", server.uri(), SITEVERIFY_PATH);
        let validator = TokenValidator::new(&config_for(endpoint, 1)).unwrap();

        let result = validator.validate(Some("valid-token-123")).await;
        assert!(matches!(result, Err(VerifyError::Timeout(_))));
    }
}
