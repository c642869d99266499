//! Turnstile token verification.
//!
//! A submitted token is exchanged with the siteverify endpoint exactly once
//! and the raw response is normalized into a `VerificationVerdict`.

mod validator;

pub use validator::{TokenValidator, VerifyError};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

/// Short, stable identifier for a token, safe to put in logs
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    URL_SAFE_NO_PAD.encode(&digest[..9])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let a = token_fingerprint("valid-token-123");
        assert_eq!(a, token_fingerprint("valid-token-123"));
        assert_eq!(a.len(), 12);
        assert_ne!(a, token_fingerprint("bad-token"));
        assert!(!a.contains("valid"));
    }
}
