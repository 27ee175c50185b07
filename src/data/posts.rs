//! Post repository
//!
//! Hand-written queries over the `posts` table. Every read joins the
//! owning account so the service layer can shape responses without a
//! second round trip; the owner columns are nullable only if the
//! foreign key has been violated out-of-band.

use sqlx::SqlitePool;

use crate::error::AppError;
use chrono::{DateTime, Utc};

/// Read-side repository for posts
#[derive(Clone)]
pub struct PostRepo {
    pool: SqlitePool,
}

/// A post row joined with its owner's display columns
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostWithOwner {
    pub id: i64,
    pub user_id: String,
    pub image_url: String,
    pub caption: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// NULL only when the owner reference is unresolvable
    pub owner_username: Option<String>,
    pub owner_display_name: Option<String>,
    pub owner_avatar_url: Option<String>,
}

const POST_WITH_OWNER_SELECT: &str = "\
    SELECT p.id, p.user_id, p.image_url, p.caption, p.created_at, p.updated_at, \
           a.username AS owner_username, \
           a.display_name AS owner_display_name, \
           a.avatar_url AS owner_avatar_url \
    FROM posts p \
    LEFT JOIN accounts a ON a.id = p.user_id";

impl PostRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch a post joined with its owning account.
    pub async fn get_with_owner(&self, id: i64) -> Result<Option<PostWithOwner>, AppError> {
        let sql = format!("{POST_WITH_OWNER_SELECT} WHERE p.id = ?");

        let post = sqlx::query_as::<_, PostWithOwner>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    /// All posts for one account, newest first.
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<PostWithOwner>, AppError> {
        if owner_id.is_empty() {
            return Ok(vec![]);
        }

        let sql = format!(
            "{POST_WITH_OWNER_SELECT} WHERE p.user_id = ? ORDER BY p.created_at DESC, p.id DESC"
        );

        let posts = sqlx::query_as::<_, PostWithOwner>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(posts)
    }

    /// One page of posts authored by any of the given accounts,
    /// newest first with id as the tie-break.
    ///
    /// The caller is responsible for short-circuiting an empty id set.
    pub async fn feed_page(
        &self,
        owner_ids: &[String],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostWithOwner>, AppError> {
        if owner_ids.is_empty() {
            return Ok(vec![]);
        }

        let placeholders = owner_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "{POST_WITH_OWNER_SELECT} WHERE p.user_id IN ({placeholders}) \
             ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?"
        );

        let mut query = sqlx::query_as::<_, PostWithOwner>(&sql);
        for owner_id in owner_ids {
            query = query.bind(owner_id);
        }
        let posts = query.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        Ok(posts)
    }
}
