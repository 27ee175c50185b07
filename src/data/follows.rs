//! Follow-edge repository
//!
//! Existence predicates and count aggregates over the `follows` table.
//! Edge writes go through the unit-of-work transaction handle.

use sqlx::SqlitePool;

use super::models::FollowEdge;
use crate::error::AppError;

/// Read-side repository for follow edges
#[derive(Clone)]
pub struct FollowRepo {
    pool: SqlitePool,
}

impl FollowRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch the edge for an ordered (follower, followee) pair.
    pub async fn get(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<Option<FollowEdge>, AppError> {
        if follower_id.is_empty() || followee_id.is_empty() {
            return Ok(None);
        }

        let edge = sqlx::query_as::<_, FollowEdge>(
            "SELECT * FROM follows WHERE follower_id = ? AND followee_id = ?",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(edge)
    }

    /// Existence predicate for an ordered (follower, followee) pair.
    pub async fn exists(&self, follower_id: &str, followee_id: &str) -> Result<bool, AppError> {
        if follower_id.is_empty() || followee_id.is_empty() {
            return Ok(false);
        }

        let found = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ? AND followee_id = ?)",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(found != 0)
    }

    /// Number of accounts following the given account.
    pub async fn follower_count(&self, id: &str) -> Result<i64, AppError> {
        if id.is_empty() {
            return Ok(0);
        }

        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE followee_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Number of accounts the given account follows.
    pub async fn following_count(&self, id: &str) -> Result<i64, AppError> {
        if id.is_empty() {
            return Ok(0);
        }

        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE follower_id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
