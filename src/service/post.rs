//! Post service
//!
//! Post creation, lookups and the follow feed. The feed resolves the
//! viewer's followee set first and returns early when it is empty: a
//! viewer following nobody must see nothing without touching the posts
//! table at all.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::{Database, PostWithOwner};
use crate::error::AppError;

/// Page size applied when the requested size is below 1
const DEFAULT_PAGE_SIZE: i64 = 10;
/// Upper clamp for one feed page
const MAX_PAGE_SIZE: i64 = 100;

/// A post shaped for API responses, joined with its owner's display data
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub user_avatar_url: String,
    pub image_url: String,
    pub caption: String,
    pub created_at: DateTime<Utc>,
}

impl PostView {
    fn from_row(row: PostWithOwner) -> Result<Self, AppError> {
        let (Some(username), Some(display_name), Some(user_avatar_url)) = (
            row.owner_username,
            row.owner_display_name,
            row.owner_avatar_url,
        ) else {
            return Err(AppError::Inconsistency(format!(
                "post {} has no resolvable owner",
                row.id
            )));
        };

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            username,
            display_name,
            user_avatar_url,
            image_url: row.image_url,
            caption: row.caption,
            created_at: row.created_at,
        })
    }
}

/// Post service
pub struct PostService {
    db: Arc<Database>,
}

impl PostService {
    /// Create new post service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Create a new post for an account.
    pub async fn create(
        &self,
        owner_id: &str,
        image_url: &str,
        caption: &str,
    ) -> Result<PostView, AppError> {
        if owner_id.is_empty() {
            return Err(AppError::Validation("User ID cannot be empty".to_string()));
        }
        if image_url.trim().is_empty() {
            return Err(AppError::Validation(
                "Image URL cannot be empty".to_string(),
            ));
        }

        let mut uow = self.db.unit_of_work().await?;
        let post_id = uow
            .insert_post(owner_id, image_url, caption, Utc::now())
            .await?;
        uow.commit().await?;

        self.get_by_id(post_id).await
    }

    /// Fetch a post by id, shaped with its owner's display data.
    pub async fn get_by_id(&self, id: i64) -> Result<PostView, AppError> {
        let row = self
            .db
            .posts()
            .get_with_owner(id)
            .await?
            .ok_or(AppError::NotFound)?;

        PostView::from_row(row)
    }

    /// All posts for one account, newest first; empty input yields an
    /// empty sequence, not an error.
    pub async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<PostView>, AppError> {
        if owner_id.is_empty() {
            return Ok(vec![]);
        }

        let rows = self.db.posts().list_by_owner(owner_id).await?;
        rows.into_iter().map(PostView::from_row).collect()
    }

    /// One page of the viewer's follow feed, newest first.
    ///
    /// `page` below 1 is clamped to 1; `page_size` below 1 falls back to
    /// the default and is capped at [`MAX_PAGE_SIZE`].
    pub async fn get_feed(
        &self,
        viewer_id: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<PostView>, AppError> {
        if viewer_id.is_empty() {
            return Ok(vec![]);
        }

        let page = page.max(1);
        let page_size = if page_size < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE)
        };

        let followee_ids = self.db.accounts().following_ids(viewer_id).await?;
        if followee_ids.is_empty() {
            return Ok(vec![]);
        }

        let offset = (page - 1) * page_size;
        let rows = self
            .db
            .posts()
            .feed_page(&followee_ids, page_size, offset)
            .await?;

        rows.into_iter().map(PostView::from_row).collect()
    }
}
