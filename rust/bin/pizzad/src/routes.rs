//! Route registration: module routes plus the system endpoints.

use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use pizza_core::ServiceError;

/// Build the complete router. Each module is nested under `/{name}`;
/// anything unmatched is a JSON 404.
pub fn build_router(module_routes: Vec<(&str, Router)>) -> Router {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/health", get(health));

    for (name, router) in module_routes {
        app = app.nest(&format!("/{}", name), router);
    }

    app.fallback(unknown_endpoint)
}

async fn index() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "message": "welcome to JWT Pizza",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn unknown_endpoint() -> ServiceError {
    ServiceError::NotFound("unknown endpoint".into())
}
