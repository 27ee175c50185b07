//! SQLite database connection
//!
//! All database access goes through this module's `Database` handle,
//! which hands out per-entity repositories and unit-of-work transactions.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;

use super::accounts::AccountRepo;
use super::follows::FollowRepo;
use super::posts::PostRepo;
use super::unit_of_work::UnitOfWork;
use crate::error::AppError;

/// Database connection pool wrapper.
///
/// Reads go through the per-entity repositories, each issuing
/// auto-committed round trips on the shared pool. Multi-step writes
/// acquire a [`UnitOfWork`] transaction handle instead.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    /// Account repository over the shared pool
    pub fn accounts(&self) -> AccountRepo {
        AccountRepo::new(self.pool.clone())
    }

    /// Post repository over the shared pool
    pub fn posts(&self) -> PostRepo {
        PostRepo::new(self.pool.clone())
    }

    /// Follow-edge repository over the shared pool
    pub fn follows(&self) -> FollowRepo {
        FollowRepo::new(self.pool.clone())
    }

    /// Begin a unit-of-work transaction for a multi-step write
    pub async fn unit_of_work(&self) -> Result<UnitOfWork, AppError> {
        UnitOfWork::begin(&self.pool).await
    }
}
