mod auth;
mod docs;
mod extract;
mod franchise;
mod order;
mod user;

use std::sync::Arc;

use axum::Router;

use pizza_core::ServiceError;

use crate::service::PizzaService;

pub use extract::{ApiJson, ApiQuery, MaybeAuthUser};

/// Shared application state.
pub type AppState = Arc<PizzaService>;

/// Build the pizza API router.
///
/// Routes are relative; the caller nests them under `/api`. Authentication
/// is per handler through the `AuthUser` extractor, so public and protected
/// methods can share a path.
pub fn build_router(svc: Arc<PizzaService>) -> Router {
    Router::new()
        .merge(auth::routes())
        .merge(user::routes())
        .merge(order::routes())
        .merge(franchise::routes())
        .merge(docs::routes())
        .with_state(svc)
}

/// Parse a numeric path id.
fn parse_id(raw: &str) -> Result<u64, ServiceError> {
    raw.parse()
        .map_err(|_| ServiceError::Validation(format!("invalid id: {}", raw)))
}
