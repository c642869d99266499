//! Shared constants for Gatehouse components.

/// Default Redis connection URL
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default Gatehouse HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8890";

/// Cloudflare Turnstile verification endpoint
pub const DEFAULT_SITEVERIFY_URL: &str =
    "https://challenges.cloudflare.com/turnstile/v0/siteverify";

/// Timeout for a single siteverify call (seconds)
pub const DEFAULT_VERIFY_TIMEOUT_SECS: u64 = 5;

/// Upper bound on total request handling time (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Form field the Turnstile widget writes its token into
pub const DEFAULT_FORM_FIELD: &str = "cf-turnstile-response";

/// Where the root path redirects to
pub const DEFAULT_MAINTENANCE_PATH: &str = "/Maint";

/// Message shown when the remote service rejects a token without an error code
pub const FALLBACK_ERROR: &str = "Invalid CAPTCHA";

/// Message shown when the remote service cannot be reached or understood
pub const SERVICE_UNAVAILABLE_ERROR: &str = "Verification service unavailable";

/// Turnstile error codes used locally
pub mod error_codes {
    /// Token was absent or empty
    pub const MISSING_INPUT_RESPONSE: &str = "missing-input-response";
}

/// Redis key names
pub mod redis_keys {
    /// Course records: hash of course_id -> JSON
    pub const COURSES: &str = "gatehouse:courses";
}
