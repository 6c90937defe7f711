use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::api::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/docs", get(docs))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Endpoint {
    method: &'static str,
    path: &'static str,
    requires_auth: bool,
    description: &'static str,
}

const fn endpoint(
    method: &'static str,
    path: &'static str,
    requires_auth: bool,
    description: &'static str,
) -> Endpoint {
    Endpoint { method, path, requires_auth, description }
}

const ENDPOINTS: &[Endpoint] = &[
    endpoint("POST", "/api/auth", false, "Register a new user"),
    endpoint("PUT", "/api/auth", false, "Login existing user"),
    endpoint("DELETE", "/api/auth", true, "Logout a user"),
    endpoint("GET", "/api/user/me", true, "Get authenticated user"),
    endpoint("GET", "/api/user", true, "List users (admin)"),
    endpoint("PUT", "/api/user/:userId", true, "Update user"),
    endpoint("GET", "/api/order/menu", false, "Get the pizza menu"),
    endpoint("PUT", "/api/order/menu", true, "Add an item to the menu (admin)"),
    endpoint("GET", "/api/order", true, "Get the orders for the authenticated user"),
    endpoint("POST", "/api/order", true, "Create an order for the authenticated user"),
    endpoint("GET", "/api/franchise", false, "List franchises"),
    endpoint("GET", "/api/franchise/:userId", true, "List a user's franchises"),
    endpoint("POST", "/api/franchise", true, "Create a new franchise (admin)"),
    endpoint("DELETE", "/api/franchise/:franchiseId", true, "Delete a franchise (admin)"),
    endpoint("POST", "/api/franchise/:franchiseId/store", true, "Create a store"),
    endpoint("DELETE", "/api/franchise/:franchiseId/store/:storeId", true, "Delete a store"),
];

/// GET /api/docs: endpoint listing.
async fn docs(State(svc): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ENDPOINTS,
        "config": { "factory": svc.config().factory_url },
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::api::build_router;
    use crate::api::testing::call;
    use crate::service::testing::service;

    #[tokio::test]
    async fn test_docs_lists_endpoints() {
        let (svc, _dir) = service();
        let app = build_router(svc);

        let (status, body) = call(&app, "GET", "/docs", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let endpoints = body["endpoints"].as_array().unwrap();
        assert!(endpoints
            .iter()
            .any(|e| e["method"] == "PUT" && e["path"] == "/api/order/menu" && e["requiresAuth"] == true));
    }
}
