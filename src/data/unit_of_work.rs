//! Unit-of-work transaction handle
//!
//! Scoped acquisition over `sqlx::Transaction`: begin at the start of a
//! multi-step write, call `commit` on the success path. Dropping the
//! handle on any other exit path rolls the transaction back. The handle
//! is never held across request boundaries.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::models::Account;
use crate::error::AppError;

/// A single write transaction bundling the entity write operations.
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    /// Begin a new transaction on the shared pool.
    pub async fn begin(pool: &SqlitePool) -> Result<Self, AppError> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    /// Commit all writes performed through this handle.
    pub async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Insert a new account row.
    pub async fn insert_account(&mut self, account: &Account) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, username, email, display_name, avatar_url,
                password_hash, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(&account.avatar_url)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    /// Partial profile update: `None` fields are left unchanged.
    ///
    /// Returns false when no row matched the id.
    pub async fn patch_profile(
        &mut self,
        id: &str,
        display_name: Option<&str>,
        avatar_url: Option<&str>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                display_name = COALESCE(?, display_name),
                avatar_url = COALESCE(?, avatar_url),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(display_name)
        .bind(avatar_url)
        .bind(updated_at)
        .bind(id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert a new post row and return its store-assigned id.
    pub async fn insert_post(
        &mut self,
        user_id: &str,
        image_url: &str,
        caption: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (user_id, image_url, caption, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(image_url)
        .bind(caption)
        .bind(created_at)
        .bind(created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a follow edge; conflict on the (follower, followee)
    /// unique constraint is reported as false, not an error.
    pub async fn insert_follow(
        &mut self,
        follower_id: &str,
        followee_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followee_id, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(follower_id, followee_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .bind(created_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a follow edge; returns false when no edge matched.
    pub async fn delete_follow(
        &mut self,
        follower_id: &str,
        followee_id: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND followee_id = ?")
            .bind(follower_id)
            .bind(followee_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
