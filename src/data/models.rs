//! Data models
//!
//! Rust structs representing database entities.
//! Accounts use ULID identifiers; posts and follow edges use
//! store-assigned numeric identifiers. All timestamps are chrono UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Account ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Account
// =============================================================================

/// A registered user identity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: String,
    /// Unique handle
    pub username: String,
    /// Unique registration/login key
    pub email: String,
    pub display_name: String,
    /// Avatar image URL
    pub avatar_url: String,
    /// argon2 PHC string; empty for accounts provisioned by federated login
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Post
// =============================================================================

/// An image post
///
/// Immutable after creation; owned by exactly one account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    /// Owning account ID
    pub user_id: String,
    pub image_url: String,
    pub caption: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Follow edge
// =============================================================================

/// A directed follow relationship between two accounts
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FollowEdge {
    pub id: i64,
    pub follower_id: String,
    pub followee_id: String,
    pub created_at: DateTime<Utc>,
}
