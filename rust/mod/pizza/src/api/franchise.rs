use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;

use pizza_core::{ListParams, ServiceError};

use crate::api::{parse_id, ApiJson, ApiQuery, AppState, MaybeAuthUser};
use crate::model::{
    AuthUser, CreateFranchise, CreateStore, FranchiseList, FranchiseView, Store,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/franchise", get(list_franchises).post(create_franchise))
        .route("/franchise/{id}", get(list_user_franchises).delete(delete_franchise))
        .route("/franchise/{id}/store", post(create_store))
        .route("/franchise/{id}/store/{store_id}", delete(delete_store))
}

/// GET /api/franchise: public listing; auditors see admins and revenue.
async fn list_franchises(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(svc): State<AppState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<FranchiseList>, ServiceError> {
    Ok(Json(svc.list_franchises(caller.as_ref(), &params)?))
}

/// GET /api/franchise/:userId: franchises the user administers.
async fn list_user_franchises(
    caller: AuthUser,
    State(svc): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<FranchiseView>>, ServiceError> {
    let user_id = parse_id(&user_id)?;
    Ok(Json(svc.list_user_franchises(&caller, user_id)?))
}

async fn create_franchise(
    caller: AuthUser,
    State(svc): State<AppState>,
    ApiJson(input): ApiJson<CreateFranchise>,
) -> Result<Json<FranchiseView>, ServiceError> {
    Ok(Json(svc.create_franchise(&caller, input)?))
}

async fn delete_franchise(
    caller: AuthUser,
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.delete_franchise(&caller, parse_id(&id)?)?;
    Ok(Json(json!({ "message": "franchise deleted" })))
}

async fn create_store(
    caller: AuthUser,
    State(svc): State<AppState>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<CreateStore>,
) -> Result<Json<Store>, ServiceError> {
    Ok(Json(svc.create_store(&caller, parse_id(&id)?, input)?))
}

async fn delete_store(
    caller: AuthUser,
    State(svc): State<AppState>,
    Path((id, store_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.delete_store(&caller, parse_id(&id)?, parse_id(&store_id)?)?;
    Ok(Json(json!({ "message": "store deleted" })))
}
