//! API layer
//!
//! HTTP handlers for:
//! - Auth (register/login/federated login)
//! - Posts and the follow feed
//! - User profiles and follow edges
//! - Metrics (Prometheus)

mod auth;
mod dto;
pub mod metrics;
mod posts;
mod users;

pub use dto::*;

pub use auth::auth_router;
pub use metrics::metrics_router;
pub use posts::posts_router;
pub use users::users_router;
