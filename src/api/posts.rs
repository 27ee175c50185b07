//! Post endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

use super::dto::{CreatePostRequest, FeedParams};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::metrics::{
    DB_QUERIES_TOTAL, DB_QUERY_DURATION_SECONDS, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION_SECONDS,
};
use crate::service::{PostService, PostView};
use crate::AppState;

/// Create posts router
pub fn posts_router() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/feed", get(feed))
        .route("/posts/user/:user_id", get(posts_by_user))
        .route("/posts/:id", get(post_by_id))
}

/// GET /posts/:id
async fn post_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostView>, AppError> {
    let post = PostService::new(state.db.clone()).get_by_id(id).await?;
    Ok(Json(post))
}

/// GET /posts/user/:user_id
async fn posts_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<PostView>>, AppError> {
    if user_id.is_empty() {
        return Err(AppError::Validation("User ID cannot be empty".to_string()));
    }

    let posts = PostService::new(state.db.clone())
        .get_by_owner(&user_id)
        .await?;
    Ok(Json(posts))
}

/// GET /posts/feed
async fn feed(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Query(params): Query<FeedParams>,
) -> Result<Json<Vec<PostView>>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/posts/feed"])
        .start_timer();

    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(10);

    let db_timer = DB_QUERY_DURATION_SECONDS
        .with_label_values(&["SELECT", "posts"])
        .start_timer();
    let posts = PostService::new(state.db.clone())
        .get_feed(&claims.sub, page, page_size)
        .await?;
    DB_QUERIES_TOTAL
        .with_label_values(&["SELECT", "posts"])
        .inc();
    db_timer.observe_duration();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/posts/feed", "200"])
        .inc();

    Ok(Json(posts))
}

/// POST /posts
async fn create_post(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/posts"])
        .start_timer();

    let post = PostService::new(state.db.clone())
        .create(&claims.sub, &payload.image_url, &payload.caption)
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/posts", "201"])
        .inc();

    let location = format!("/posts/{}", post.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(post),
    ))
}
