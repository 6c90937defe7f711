use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};

use pizza_core::{ListParams, ServiceError};

use crate::api::{parse_id, ApiJson, ApiQuery, AppState};
use crate::model::{AuthResponse, AuthUser, UpdateUser, User, UserList};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(list_users))
        .route("/user/me", get(me))
        .route("/user/{id}", put(update_user))
}

/// GET /api/user/me: the authenticated caller.
async fn me(caller: AuthUser, State(svc): State<AppState>) -> Result<Json<User>, ServiceError> {
    Ok(Json(svc.get_user(caller.id)?))
}

async fn list_users(
    caller: AuthUser,
    State(svc): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<UserList>, ServiceError> {
    Ok(Json(svc.list_users(&caller, &params)?))
}

async fn update_user(
    caller: AuthUser,
    State(svc): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<UpdateUser>,
) -> Result<Json<AuthResponse>, ServiceError> {
    let id = parse_id(&id)?;
    Ok(Json(svc.update_user(&caller, id, input)?))
}
