//! Bearer token issuance and validation
//!
//! HS256 JWTs carrying subject/handle/email claims, signed with the
//! configured secret and validated against the configured issuer and
//! audience. Validity window is 7 days by default; there is no refresh
//! token mechanism.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::data::Account;
use crate::error::AppError;

/// Claims carried by a PeerLens bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: account id
    pub sub: String,
    /// Account handle
    pub username: String,
    pub email: String,
    pub iss: String,
    pub aud: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Claims read from an external identity token
///
/// Only the profile claims are of interest; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalClaims {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Issue a signed bearer token for an account.
pub fn issue_token(account: &Account, auth: &AuthConfig) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: account.id.clone(),
        username: account.username.clone(),
        email: account.email.clone(),
        iss: auth.issuer.clone(),
        aud: auth.audience.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::days(auth.token_ttl_days)).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.into()))
}

/// Verify a bearer token and return its claims.
///
/// Checks signature, expiry, issuer and audience. Any failure maps to
/// `Unauthorized`; the caller never learns which check failed.
pub fn verify_token(token: &str, auth: &AuthConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&auth.issuer]);
    validation.set_audience(&[&auth.audience]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)?;

    Ok(data.claims)
}

/// Decode an external identity token's claims without verifying its
/// signature against the issuer.
///
/// Transport-level validation is the caller's responsibility; this code
/// path only reads the profile claims out of the payload.
pub fn decode_unverified_claims(token: &str) -> Result<ExternalClaims, AppError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    // External issuers sign with RS256/ES256; local test fixtures use HS256
    validation.algorithms = vec![Algorithm::RS256, Algorithm::ES256, Algorithm::HS256];

    let data = decode::<ExternalClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|_| AppError::Validation("Invalid identity token".to_string()))?;

    Ok(data.claims)
}
