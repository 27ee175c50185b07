//! Data layer module
//!
//! Handles all data persistence:
//! - SQLite connection and migrations
//! - Per-entity repositories (hand-written queries)
//! - Unit-of-work transaction handle for multi-step writes

mod accounts;
mod database;
mod follows;
mod models;
mod posts;
mod unit_of_work;

pub use accounts::{AccountRelationships, AccountRepo};
pub use database::Database;
pub use follows::FollowRepo;
pub use models::*;
pub use posts::{PostRepo, PostWithOwner};
pub use unit_of_work::UnitOfWork;
