//! Follow service
//!
//! Manages directed follow edges between accounts. Business-rule
//! refusals (self-follow, missing accounts, duplicate edges) surface as
//! a boolean false, not an error; the store's unique constraint
//! backstops the window between the duplicate pre-check and the insert.

use std::sync::Arc;

use chrono::Utc;

use crate::data::Database;
use crate::error::AppError;

/// Follow service
pub struct FollowService {
    db: Arc<Database>,
}

impl FollowService {
    /// Create new follow service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Establish a follow edge from `follower_id` to `followee_id`.
    ///
    /// Fails closed (false, no error) when either account is the other,
    /// either account does not exist, or the edge already exists.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> Result<bool, AppError> {
        if follower_id.is_empty() {
            return Err(AppError::Validation(
                "Follower ID cannot be empty".to_string(),
            ));
        }
        if followee_id.is_empty() {
            return Err(AppError::Validation(
                "Followee ID cannot be empty".to_string(),
            ));
        }

        // Can't follow yourself
        if follower_id == followee_id {
            return Ok(false);
        }

        // Check if both accounts exist
        let accounts = self.db.accounts();
        if accounts.get_by_id(follower_id).await?.is_none()
            || accounts.get_by_id(followee_id).await?.is_none()
        {
            return Ok(false);
        }

        // Check if already following
        if self.db.follows().get(follower_id, followee_id).await?.is_some() {
            return Ok(false);
        }

        let mut uow = self.db.unit_of_work().await?;
        let inserted = uow
            .insert_follow(follower_id, followee_id, Utc::now())
            .await?;
        uow.commit().await?;

        Ok(inserted)
    }

    /// Remove a follow edge; false when no such edge exists.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> Result<bool, AppError> {
        if follower_id.is_empty() {
            return Err(AppError::Validation(
                "Follower ID cannot be empty".to_string(),
            ));
        }
        if followee_id.is_empty() {
            return Err(AppError::Validation(
                "Followee ID cannot be empty".to_string(),
            ));
        }

        if self.db.follows().get(follower_id, followee_id).await?.is_none() {
            return Ok(false);
        }

        let mut uow = self.db.unit_of_work().await?;
        let removed = uow.delete_follow(follower_id, followee_id).await?;
        uow.commit().await?;

        Ok(removed)
    }

    /// Existence predicate; false on empty inputs.
    pub async fn is_following(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<bool, AppError> {
        self.db.follows().exists(follower_id, followee_id).await
    }

    /// Number of accounts following the given account; zero on empty input.
    pub async fn follower_count(&self, id: &str) -> Result<i64, AppError> {
        self.db.follows().follower_count(id).await
    }

    /// Number of accounts the given account follows; zero on empty input.
    pub async fn following_count(&self, id: &str) -> Result<i64, AppError> {
        self.db.follows().following_count(id).await
    }
}
