use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use pizza_core::ServiceError;

use crate::api::{ApiJson, AppState};
use crate::model::{AuthResponse, AuthUser, LoginRequest, RegisterRequest};

pub fn routes() -> Router<AppState> {
    let methods = || post(register).put(login).delete(logout);
    Router::new()
        .route("/auth", methods())
        .route("/auth/", methods())
}

/// POST /api/auth: register a diner.
async fn register(
    State(svc): State<AppState>,
    ApiJson(input): ApiJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, ServiceError> {
    Ok(Json(svc.register(input)?))
}

/// PUT /api/auth: log in.
async fn login(
    State(svc): State<AppState>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ServiceError> {
    Ok(Json(svc.login(input)?))
}

/// DELETE /api/auth: end the current session.
async fn logout(
    caller: AuthUser,
    State(svc): State<AppState>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.logout(&caller)?;
    Ok(Json(json!({ "message": "logout successful" })))
}
