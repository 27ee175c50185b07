//! Authentication endpoints

use axum::{extract::State, response::Json, routing::post, Router};

use super::dto::{FederatedLoginRequest, LoginRequest, RegisterRequest};
use crate::error::AppError;
use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use crate::service::{AuthOutcome, AuthService};
use crate::AppState;

/// Create auth router
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/google", post(federated_login))
}

fn into_response(outcome: AuthOutcome) -> Result<Json<AuthOutcome>, AppError> {
    if !outcome.succeeded {
        return Err(AppError::Denied(outcome.message));
    }
    Ok(Json(outcome))
}

/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthOutcome>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/auth/register"])
        .start_timer();

    let outcome = AuthService::new(state.db.clone(), state.config.clone())
        .register(
            &payload.username,
            &payload.email,
            &payload.password,
            &payload.display_name,
        )
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/auth/register", "200"])
        .inc();

    into_response(outcome)
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthOutcome>, AppError> {
    let outcome = AuthService::new(state.db.clone(), state.config.clone())
        .login(&payload.email, &payload.password)
        .await?;

    into_response(outcome)
}

/// POST /auth/google
async fn federated_login(
    State(state): State<AppState>,
    Json(payload): Json<FederatedLoginRequest>,
) -> Result<Json<AuthOutcome>, AppError> {
    let outcome = AuthService::new(state.db.clone(), state.config.clone())
        .federated_login(&payload.id_token)
        .await?;

    into_response(outcome)
}
