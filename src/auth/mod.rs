//! JWT authentication
//!
//! Handles:
//! - Bearer token issuance and validation
//! - Identity extractors for handlers

mod middleware;
pub mod token;

pub use middleware::{CurrentUser, MaybeUser};
pub use token::{decode_unverified_claims, issue_token, verify_token, Claims, ExternalClaims};
