//! Core types shared across Gatehouse components.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::FALLBACK_ERROR;
use crate::error::GateError;

/// Shared secret identifying this deployment to Turnstile.
///
/// Loaded once at startup and never mutated. `Debug` output is redacted so
/// the value cannot leak through logs or error chains.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationSecret(String);

impl VerificationSecret {
    /// Create a secret, rejecting empty or whitespace-only values
    pub fn new(value: impl Into<String>) -> Result<Self, GateError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(GateError::Config(
                "Turnstile secret key is empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Raw secret value, for building the siteverify request only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VerificationSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationSecret(***)")
    }
}

/// Body sent to the siteverify endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SiteverifyRequest<'a> {
    pub response: &'a str,
    pub secret: &'a str,
}

/// Body returned by the siteverify endpoint.
///
/// Only `success` and `error-codes` drive decisions. The rest is opaque,
/// kept for logging, and accepted in any JSON shape so an odd value never
/// turns a verdict into a parse failure. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteverifyResponse {
    pub success: bool,

    #[serde(rename = "error-codes", default)]
    pub error_codes: Vec<String>,

    #[serde(default)]
    pub action: Option<serde_json::Value>,

    #[serde(default)]
    pub cdata: Option<serde_json::Value>,

    #[serde(default)]
    pub challenge_ts: Option<serde_json::Value>,

    #[serde(default)]
    pub hostname: Option<serde_json::Value>,
}

impl SiteverifyResponse {
    /// Challenge solve time, when present and RFC 3339
    pub fn challenge_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.challenge_ts.as_ref()?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}

/// Normalized outcome of asking Turnstile whether a token is valid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationVerdict {
    success: bool,
    error_code: Option<String>,
}

impl VerificationVerdict {
    /// Token was accepted
    pub fn passed() -> Self {
        Self {
            success: true,
            error_code: None,
        }
    }

    /// Token was rejected, optionally with the first reported error code
    pub fn rejected(error_code: Option<String>) -> Self {
        Self {
            success: false,
            error_code,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }

    /// Render the verdict for the calling action
    pub fn into_outcome(self) -> ActionOutcome {
        if self.success {
            ActionOutcome::granted()
        } else {
            ActionOutcome::denied(self.error_code.unwrap_or_else(|| FALLBACK_ERROR.to_string()))
        }
    }
}

impl From<SiteverifyResponse> for VerificationVerdict {
    fn from(response: SiteverifyResponse) -> Self {
        if response.success {
            // A passing verdict never carries an error code
            Self::passed()
        } else {
            Self::rejected(response.error_codes.into_iter().next())
        }
    }
}

/// Caller-facing result of a protected form action.
///
/// Serializes as `{"success": true}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionOutcome {
    Denied { error: String },
    Granted { success: bool },
}

impl ActionOutcome {
    pub fn granted() -> Self {
        Self::Granted { success: true }
    }

    pub fn denied(error: impl Into<String>) -> Self {
        Self::Denied {
            error: error.into(),
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { success: true })
    }
}

/// A course record as stored in the data store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier (used in `/course/{id}`)
    pub id: String,

    /// Display title
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Where the course content lives once access is granted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
