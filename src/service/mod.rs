//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services validate input, orchestrate repository calls and shape
//! response records.

mod account;
mod auth;
mod follow;
mod post;

pub use account::{AccountService, Profile};
pub use auth::{AuthOutcome, AuthService};
pub use follow::FollowService;
pub use post::{PostService, PostView};
