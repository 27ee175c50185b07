//! User profile and follow endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};

use super::dto::UpdateProfileRequest;
use crate::auth::{CurrentUser, MaybeUser};
use crate::error::AppError;
use crate::service::{AccountService, FollowService, Profile};
use crate::AppState;

/// Create users router
pub fn users_router() -> Router<AppState> {
    Router::new()
        .route("/users", put(update_profile))
        .route("/users/follow/:id", post(follow_user))
        .route("/users/unfollow/:id", delete(unfollow_user))
        .route("/users/username/:username", get(profile_by_username))
        .route("/users/:id/followers", get(followers))
        .route("/users/:id/following", get(following))
        .route("/users/:id", get(profile_by_id))
}

fn viewer_id(viewer: &MaybeUser) -> Option<&str> {
    viewer.0.as_ref().map(|claims| claims.sub.as_str())
}

/// GET /users/:id
async fn profile_by_id(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    if id.is_empty() {
        return Err(AppError::Validation("User ID cannot be empty".to_string()));
    }

    let profile = AccountService::new(state.db.clone())
        .get_profile(&id, viewer_id(&viewer))
        .await?;
    Ok(Json(profile))
}

/// GET /users/username/:username
async fn profile_by_username(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(username): Path<String>,
) -> Result<Json<Profile>, AppError> {
    if username.is_empty() {
        return Err(AppError::Validation("Username cannot be empty".to_string()));
    }

    let profile = AccountService::new(state.db.clone())
        .get_profile_by_username(&username, viewer_id(&viewer))
        .await?;
    Ok(Json(profile))
}

/// GET /users/:id/followers
async fn followers(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Profile>>, AppError> {
    if id.is_empty() {
        return Err(AppError::Validation("User ID cannot be empty".to_string()));
    }

    let profiles = AccountService::new(state.db.clone())
        .followers(&id, viewer_id(&viewer))
        .await?;
    Ok(Json(profiles))
}

/// GET /users/:id/following
async fn following(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Profile>>, AppError> {
    if id.is_empty() {
        return Err(AppError::Validation("User ID cannot be empty".to_string()));
    }

    let profiles = AccountService::new(state.db.clone())
        .following(&id, viewer_id(&viewer))
        .await?;
    Ok(Json(profiles))
}

/// PUT /users
async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    let profile = AccountService::new(state.db.clone())
        .update_profile(
            &claims.sub,
            payload.display_name.as_deref(),
            payload.avatar_url.as_deref(),
        )
        .await?;
    Ok(Json(profile))
}

/// POST /users/follow/:id
async fn follow_user(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if id.is_empty() {
        return Err(AppError::Validation(
            "User ID to follow cannot be empty".to_string(),
        ));
    }
    if claims.sub == id {
        return Err(AppError::Denied(
            "Users cannot follow themselves".to_string(),
        ));
    }

    let followed = FollowService::new(state.db.clone())
        .follow(&claims.sub, &id)
        .await?;
    if !followed {
        return Err(AppError::Denied("Failed to follow user".to_string()));
    }

    Ok(StatusCode::OK)
}

/// DELETE /users/unfollow/:id
async fn unfollow_user(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if id.is_empty() {
        return Err(AppError::Validation(
            "User ID to unfollow cannot be empty".to_string(),
        ));
    }

    let unfollowed = FollowService::new(state.db.clone())
        .unfollow(&claims.sub, &id)
        .await?;
    if !unfollowed {
        return Err(AppError::Denied("Failed to unfollow user".to_string()));
    }

    Ok(StatusCode::OK)
}
