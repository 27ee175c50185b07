//! Account repository
//!
//! Hand-written queries over the `accounts` table plus the
//! relationship lookups that hang off an account (its posts and the
//! accounts on either side of its follow edges).

use sqlx::SqlitePool;

use super::models::{Account, Post};
use crate::error::AppError;

/// Read-side repository for accounts
#[derive(Clone)]
pub struct AccountRepo {
    pool: SqlitePool,
}

/// An account together with its eagerly loaded relationship collections
#[derive(Debug, Clone)]
pub struct AccountRelationships {
    pub account: Account,
    /// Posts owned by the account, newest first
    pub posts: Vec<Post>,
    /// IDs of accounts following this one
    pub follower_ids: Vec<String>,
    /// IDs of accounts this one follows
    pub following_ids: Vec<String>,
}

impl AccountRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up an account by its identifier; empty input short-circuits.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Account>, AppError> {
        if id.is_empty() {
            return Ok(None);
        }

        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Look up an account by handle (exact match, store collation).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        if username.is_empty() {
            return Ok(None);
        }

        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Look up an account by email (registration dedupe, login).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        if email.is_empty() {
            return Ok(None);
        }

        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(account)
    }

    /// Fetch an account with its posts and both follow-edge collections.
    pub async fn get_with_relationships(
        &self,
        id: &str,
    ) -> Result<Option<AccountRelationships>, AppError> {
        let Some(account) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let follower_ids = self.follower_ids(id).await?;
        let following_ids = self.following_ids(id).await?;

        Ok(Some(AccountRelationships {
            account,
            posts,
            follower_ids,
            following_ids,
        }))
    }

    /// IDs of accounts following the given account.
    pub async fn follower_ids(&self, id: &str) -> Result<Vec<String>, AppError> {
        if id.is_empty() {
            return Ok(vec![]);
        }

        let ids = sqlx::query_scalar::<_, String>(
            "SELECT follower_id FROM follows WHERE followee_id = ? ORDER BY created_at DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// IDs of accounts the given account follows.
    pub async fn following_ids(&self, id: &str) -> Result<Vec<String>, AppError> {
        if id.is_empty() {
            return Ok(vec![]);
        }

        let ids = sqlx::query_scalar::<_, String>(
            "SELECT followee_id FROM follows WHERE follower_id = ? ORDER BY created_at DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
