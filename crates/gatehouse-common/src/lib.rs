//! # Gatehouse Common
//!
//! Shared types and utilities used across Gatehouse components.
//!
//! ## Modules
//! - `types` - Core data structures (VerificationVerdict, ActionOutcome, Course, etc.)
//! - `error` - Common error types
//! - `constants` - Shared configuration constants

pub mod constants;
pub mod error;
pub mod types;

pub use error::GateError;
pub use types::*;
