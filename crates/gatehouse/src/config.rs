//! Configuration management for Gatehouse.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

use gatehouse_common::constants::{
    DEFAULT_FORM_FIELD, DEFAULT_LISTEN_ADDR, DEFAULT_MAINTENANCE_PATH, DEFAULT_REDIS_URL,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SITEVERIFY_URL, DEFAULT_VERIFY_TIMEOUT_SECS,
};
use gatehouse_common::{Course, GateError, VerificationSecret};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Where course records come from
    #[serde(default)]
    pub course_store: CourseBackend,

    /// Redis connection URL (course store)
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Course records served by the `memory` backend
    #[serde(default)]
    pub courses: Vec<Course>,

    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Path the root URL redirects to
    #[serde(default = "default_maintenance_path")]
    pub maintenance_path: String,

    /// Upper bound on total request handling time
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Turnstile verification configuration
    #[serde(default)]
    pub turnstile: TurnstileConfig,
}

/// Course store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseBackend {
    /// Redis hash `gatehouse:courses`
    #[default]
    Redis,
    /// The `courses` list from this config
    Memory,
}

/// Turnstile-specific configuration
#[derive(Clone, Deserialize)]
pub struct TurnstileConfig {
    /// Shared secret for siteverify. Required; there is no default.
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Verification endpoint
    #[serde(default = "default_siteverify_url")]
    pub siteverify_url: String,

    /// Timeout for a single siteverify call
    #[serde(default = "default_verify_timeout")]
    pub timeout_secs: u64,

    /// Form field carrying the widget token
    #[serde(default = "default_form_field")]
    pub form_field: String,
}

impl TurnstileConfig {
    /// Resolve the shared secret, failing if it was never configured
    pub fn secret(&self) -> Result<VerificationSecret, GateError> {
        match self.secret_key.as_deref() {
            Some(key) => VerificationSecret::new(key),
            None => Err(GateError::Config(
                "turnstile.secret_key is not set (use TURNSTILE_SECRET_KEY)".to_string(),
            )),
        }
    }
}

impl Default for TurnstileConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            siteverify_url: default_siteverify_url(),
            timeout_secs: default_verify_timeout(),
            form_field: default_form_field(),
        }
    }
}

impl std::fmt::Debug for TurnstileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnstileConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .field("siteverify_url", &self.siteverify_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("form_field", &self.form_field)
            .finish()
    }
}

/// Paths served by fixed routes
const RESERVED_PATHS: &[&str] = &["/health", "/ready", "/courses"];

// Default value functions
fn default_redis_url() -> String { DEFAULT_REDIS_URL.to_string() }
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_maintenance_path() -> String { DEFAULT_MAINTENANCE_PATH.to_string() }
fn default_request_timeout() -> u64 { DEFAULT_REQUEST_TIMEOUT_SECS }
fn default_siteverify_url() -> String { DEFAULT_SITEVERIFY_URL.to_string() }
fn default_verify_timeout() -> u64 { DEFAULT_VERIFY_TIMEOUT_SECS }
fn default_form_field() -> String { DEFAULT_FORM_FIELD.to_string() }

impl AppConfig {
    /// Load configuration from file and environment, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        if !Path::new(config_path).exists() {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
        }

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("GATEHOUSE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to load config file")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .context("Failed to parse config")?;

        // Apply CLI overrides
        if let Some(ref redis_url) = args.redis_url {
            config.redis_url = redis_url.clone();
        }
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(ref secret) = args.turnstile_secret {
            config.turnstile.secret_key = Some(secret.clone());
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        self.turnstile
            .secret()
            .context("Turnstile secret is required")?;

        let path = self.maintenance_path.as_str();
        if !path.starts_with('/') || path == "/" {
            bail!("maintenance_path must be an absolute path other than '/', got {:?}", path);
        }
        if path.contains(['{', '}']) {
            bail!("maintenance_path must be a literal path, got {:?}", path);
        }
        if RESERVED_PATHS.contains(&path) || path.starts_with("/course/") {
            bail!("maintenance_path {:?} collides with a built-in route", path);
        }

        if self.turnstile.timeout_secs == 0 {
            bail!("turnstile.timeout_secs must be greater than zero");
        }
        // A slow siteverify call has to fail as a 503 before the request
        // timeout cuts it off with a bare 408
        if self.request_timeout_secs <= self.turnstile.timeout_secs {
            bail!(
                "request_timeout_secs ({}) must be greater than turnstile.timeout_secs ({})",
                self.request_timeout_secs,
                self.turnstile.timeout_secs
            );
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            course_store: CourseBackend::default(),
            redis_url: default_redis_url(),
            courses: Vec::new(),
            listen_addr: default_listen_addr(),
            maintenance_path: default_maintenance_path(),
            request_timeout_secs: default_request_timeout(),
            turnstile: TurnstileConfig::default(),
        }
    }
}
