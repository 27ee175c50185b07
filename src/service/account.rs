//! Account service
//!
//! Profile retrieval and partial profile updates. A profile is the
//! account record enriched with derived counts and viewer-relative
//! follow state; counts are computed per request, never cached.

use std::sync::Arc;

use serde::Serialize;

use crate::data::Database;
use crate::error::AppError;

fn normalize_patch_field(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// An account enriched with derived counts and follow state
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub avatar_url: String,
    pub followers_count: i64,
    pub following_count: i64,
    pub posts_count: i64,
    /// Whether the viewing account follows this one; false for anonymous viewers
    pub is_following: bool,
}

/// Account service
pub struct AccountService {
    db: Arc<Database>,
}

impl AccountService {
    /// Create new account service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Get a profile by account id
    ///
    /// # Arguments
    /// * `id` - Subject account id
    /// * `viewer` - Resolved viewer id, or None for anonymous requests
    pub async fn get_profile(&self, id: &str, viewer: Option<&str>) -> Result<Profile, AppError> {
        if id.is_empty() {
            return Err(AppError::NotFound);
        }

        let rels = self
            .db
            .accounts()
            .get_with_relationships(id)
            .await?
            .ok_or(AppError::NotFound)?;

        let follows = self.db.follows();
        let followers_count = follows.follower_count(id).await?;
        let following_count = follows.following_count(id).await?;
        let posts_count = rels.posts.len() as i64;

        let is_following = match viewer {
            Some(viewer) if !viewer.is_empty() => follows.exists(viewer, id).await?,
            _ => false,
        };

        let account = rels.account;
        Ok(Profile {
            id: account.id,
            username: account.username,
            display_name: account.display_name,
            email: account.email,
            avatar_url: account.avatar_url,
            followers_count,
            following_count,
            posts_count,
            is_following,
        })
    }

    /// Get a profile by handle
    pub async fn get_profile_by_username(
        &self,
        username: &str,
        viewer: Option<&str>,
    ) -> Result<Profile, AppError> {
        if username.is_empty() {
            return Err(AppError::NotFound);
        }

        let account = self
            .db
            .accounts()
            .get_by_username(username)
            .await?
            .ok_or(AppError::NotFound)?;

        self.get_profile(&account.id, viewer).await
    }

    /// Partial profile update
    ///
    /// Only non-empty fields are applied; absent or empty fields are left
    /// unchanged. Last writer wins. Returns the refreshed self-profile.
    pub async fn update_profile(
        &self,
        id: &str,
        display_name: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<Profile, AppError> {
        if id.is_empty() {
            return Err(AppError::NotFound);
        }

        let account = self
            .db
            .accounts()
            .get_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        let display_name_patch = normalize_patch_field(display_name);
        let avatar_url_patch = normalize_patch_field(avatar_url);

        if display_name_patch.is_some() || avatar_url_patch.is_some() {
            let mut uow = self.db.unit_of_work().await?;
            let updated = uow
                .patch_profile(
                    &account.id,
                    display_name_patch,
                    avatar_url_patch,
                    chrono::Utc::now(),
                )
                .await?;
            uow.commit().await?;

            if !updated {
                return Err(AppError::NotFound);
            }
        }

        self.get_profile(id, Some(id)).await
    }

    /// Profiles of the accounts following the given one
    pub async fn followers(&self, id: &str, viewer: Option<&str>) -> Result<Vec<Profile>, AppError> {
        if id.is_empty() {
            return Ok(vec![]);
        }

        let ids = self.db.accounts().follower_ids(id).await?;
        self.profiles_for(ids, viewer).await
    }

    /// Profiles of the accounts the given one follows
    pub async fn following(&self, id: &str, viewer: Option<&str>) -> Result<Vec<Profile>, AppError> {
        if id.is_empty() {
            return Ok(vec![]);
        }

        let ids = self.db.accounts().following_ids(id).await?;
        self.profiles_for(ids, viewer).await
    }

    async fn profiles_for(
        &self,
        ids: Vec<String>,
        viewer: Option<&str>,
    ) -> Result<Vec<Profile>, AppError> {
        let mut profiles = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_profile(&id, viewer).await {
                Ok(profile) => profiles.push(profile),
                // Edges are not cascade-deleted; skip unresolvable endpoints
                Err(AppError::NotFound) => continue,
                Err(error) => return Err(error),
            }
        }
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Account, EntityId};
    use chrono::Utc;
    use tempfile::TempDir;

    async fn create_test_db() -> (Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("service-account.db");
        let db = Database::connect(&db_path).await.unwrap();
        (Arc::new(db), temp_dir)
    }

    async fn seed_account(db: &Database, username: &str) -> Account {
        let account = Account {
            id: EntityId::new().0,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            display_name: username.to_string(),
            avatar_url: "https://img.example.com/avatar.png".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut uow = db.unit_of_work().await.unwrap();
        uow.insert_account(&account).await.unwrap();
        uow.commit().await.unwrap();
        account
    }

    async fn seed_follow(db: &Database, follower: &str, followee: &str) {
        let mut uow = db.unit_of_work().await.unwrap();
        assert!(uow.insert_follow(follower, followee, Utc::now()).await.unwrap());
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn get_profile_computes_counts_and_follow_state() {
        let (db, _temp_dir) = create_test_db().await;
        let service = AccountService::new(db.clone());

        let alice = seed_account(&db, "alice").await;
        let bob = seed_account(&db, "bob").await;
        let carol = seed_account(&db, "carol").await;

        seed_follow(&db, &bob.id, &alice.id).await;
        seed_follow(&db, &carol.id, &alice.id).await;
        seed_follow(&db, &alice.id, &bob.id).await;

        let mut uow = db.unit_of_work().await.unwrap();
        uow.insert_post(&alice.id, "https://img.example.com/1.jpg", "", Utc::now())
            .await
            .unwrap();
        uow.commit().await.unwrap();

        let profile = service.get_profile(&alice.id, Some(&bob.id)).await.unwrap();
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.followers_count, 2);
        assert_eq!(profile.following_count, 1);
        assert_eq!(profile.posts_count, 1);
        assert!(profile.is_following);

        // Anonymous viewers never appear as following
        let anonymous = service.get_profile(&alice.id, None).await.unwrap();
        assert!(!anonymous.is_following);

        let non_follower = service
            .get_profile(&bob.id, Some(&carol.id))
            .await
            .unwrap();
        assert_eq!(non_follower.followers_count, 1);
        assert!(!non_follower.is_following);
    }

    #[tokio::test]
    async fn get_profile_missing_account_is_not_found() {
        let (db, _temp_dir) = create_test_db().await;
        let service = AccountService::new(db);

        let error = service.get_profile("missing", None).await.unwrap_err();
        assert!(matches!(error, AppError::NotFound));

        let error = service.get_profile("", None).await.unwrap_err();
        assert!(matches!(error, AppError::NotFound));
    }

    #[tokio::test]
    async fn get_profile_by_username_resolves_handle() {
        let (db, _temp_dir) = create_test_db().await;
        let service = AccountService::new(db.clone());

        let alice = seed_account(&db, "alice").await;

        let profile = service.get_profile_by_username("alice", None).await.unwrap();
        assert_eq!(profile.id, alice.id);

        let error = service
            .get_profile_by_username("nobody", None)
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::NotFound));
    }

    #[tokio::test]
    async fn update_profile_merges_partial_patch() {
        let (db, _temp_dir) = create_test_db().await;
        let service = AccountService::new(db.clone());

        let alice = seed_account(&db, "alice").await;

        let updated = service
            .update_profile(&alice.id, Some("Alice A."), None)
            .await
            .unwrap();
        assert_eq!(updated.display_name, "Alice A.");
        assert_eq!(updated.avatar_url, alice.avatar_url);

        // Empty fields leave everything unchanged
        let unchanged = service
            .update_profile(&alice.id, Some(""), Some("  "))
            .await
            .unwrap();
        assert_eq!(unchanged.display_name, "Alice A.");
        assert_eq!(unchanged.avatar_url, alice.avatar_url);

        let avatar_only = service
            .update_profile(&alice.id, None, Some("https://img.example.com/new.png"))
            .await
            .unwrap();
        assert_eq!(avatar_only.display_name, "Alice A.");
        assert_eq!(avatar_only.avatar_url, "https://img.example.com/new.png");

        let error = service
            .update_profile("missing", Some("x"), None)
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::NotFound));
    }

    #[tokio::test]
    async fn followers_and_following_lists() {
        let (db, _temp_dir) = create_test_db().await;
        let service = AccountService::new(db.clone());

        let alice = seed_account(&db, "alice").await;
        let bob = seed_account(&db, "bob").await;
        let carol = seed_account(&db, "carol").await;

        seed_follow(&db, &bob.id, &alice.id).await;
        seed_follow(&db, &carol.id, &alice.id).await;
        seed_follow(&db, &alice.id, &carol.id).await;

        let followers = service.followers(&alice.id, Some(&carol.id)).await.unwrap();
        assert_eq!(followers.len(), 2);
        let carol_entry = followers.iter().find(|p| p.id == carol.id).unwrap();
        // Carol views her own entry; she does not follow herself
        assert!(!carol_entry.is_following);

        let following = service.following(&alice.id, Some(&bob.id)).await.unwrap();
        assert_eq!(following.len(), 1);
        assert_eq!(following[0].id, carol.id);

        assert!(service.followers(&bob.id, None).await.unwrap().is_empty());
        assert!(service.followers("", None).await.unwrap().is_empty());
    }
}
