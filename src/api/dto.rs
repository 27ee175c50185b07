//! API request payloads
//!
//! Response records are shaped by the service layer; the boundary only
//! owns the inbound DTOs.

use serde::Deserialize;

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: String,
}

/// Password login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Federated login request carrying the external identity token
#[derive(Debug, Deserialize)]
pub struct FederatedLoginRequest {
    pub id_token: String,
}

/// Post creation request
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
}

/// Partial profile update; absent or empty fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Feed pagination parameters
#[derive(Debug, Deserialize)]
pub struct FeedParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
