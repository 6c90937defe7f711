use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use pizza_core::error::error_code;
use pizza_core::ServiceError;

use crate::api::{ApiJson, ApiQuery, AppState};
use crate::model::{AddMenuItem, AuthUser, CreateOrder, MenuItem, OrderPage, OrderQuery};
use crate::service::order::Fulfilment;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/order/menu", get(list_menu).put(add_menu_item))
        .route("/order", get(list_orders).post(create_order))
}

async fn list_menu(State(svc): State<AppState>) -> Result<Json<Vec<MenuItem>>, ServiceError> {
    Ok(Json(svc.list_menu()?))
}

async fn add_menu_item(
    caller: AuthUser,
    State(svc): State<AppState>,
    ApiJson(input): ApiJson<AddMenuItem>,
) -> Result<Json<Vec<MenuItem>>, ServiceError> {
    Ok(Json(svc.add_menu_item(&caller, input)?))
}

async fn list_orders(
    caller: AuthUser,
    State(svc): State<AppState>,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> Result<Json<OrderPage>, ServiceError> {
    Ok(Json(svc.list_orders(&caller, query.page)?))
}

/// POST /api/order: place an order. A factory failure is a 500 carrying
/// the factory's report link; the order itself stays stored.
async fn create_order(
    caller: AuthUser,
    State(svc): State<AppState>,
    ApiJson(input): ApiJson<CreateOrder>,
) -> Result<Response, ServiceError> {
    match svc.place_order(&caller, input).await? {
        Fulfilment::Fulfilled(receipt) => Ok(Json(receipt).into_response()),
        Fulfilment::Failed { error, .. } => Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "code": error_code::INTERNAL,
                "message": "Failed to fulfill order at factory",
                "followLinkToEndChaos": error.report_url(),
            })),
        )
            .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::Router;
    use serde_json::json;

    use crate::api::build_router;
    use crate::api::testing::{admin_token, call, diner_token};
    use crate::service::testing::{service, service_with, StubFactory};
    use crate::service::PizzaService;

    /// Menu item, franchise and store created over HTTP. Returns
    /// (franchise id, store id, menu id).
    async fn seed(svc: &PizzaService, app: &Router) -> (u64, u64, u64) {
        let root = admin_token(svc, app).await;
        let item = json!({"title": "Veggie", "description": "A garden of delight", "image": "pizza1.png", "price": 0.0038});
        let (status, menu) = call(app, "PUT", "/order/menu", Some(&root), Some(item)).await;
        assert_eq!(status, StatusCode::OK);
        let menu_id = menu[0]["id"].as_u64().unwrap();

        let (_, f) = call(app, "POST", "/franchise", Some(&root), Some(json!({"name": "pizzaPocket", "admins": []}))).await;
        let fid = f["id"].as_u64().unwrap();
        let (_, s) = call(app, "POST", &format!("/franchise/{}/store", fid), Some(&root), Some(json!({"name": "SLC"}))).await;
        (fid, s["id"].as_u64().unwrap(), menu_id)
    }

    fn order_body(fid: u64, sid: u64, menu_id: u64) -> serde_json::Value {
        json!({
            "franchiseId": fid,
            "storeId": sid,
            "items": [{"menuId": menu_id, "description": "Veggie", "price": 0.05}],
        })
    }

    #[tokio::test]
    async fn test_menu_is_public_but_admin_edits() {
        let (svc, _dir) = service();
        let app = build_router(svc.clone());
        let token = diner_token(&app, "dee").await;
        let root = admin_token(&svc, &app).await;

        let (status, menu) = call(&app, "GET", "/order/menu", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(menu, json!([]));

        let item = json!({"title": "Pepperoni", "price": 0.0042});
        let (status, _) = call(&app, "PUT", "/order/menu", None, Some(item.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = call(&app, "PUT", "/order/menu", Some(&token), Some(item.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(&app, "PUT", "/order/menu", Some(&root), Some(item)).await;
        assert_eq!(status, StatusCode::OK);

        // Readable with or without a token.
        for caller in [None, Some(token.as_str())] {
            let (status, menu) = call(&app, "GET", "/order/menu", caller, None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(menu[0]["title"], "Pepperoni");
        }

        let (status, body) = call(&app, "PUT", "/order/menu", Some(&root), Some(json!({"title": "NoPrice"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn test_order_round_trip() {
        let (svc, _dir) = service();
        let app = build_router(svc.clone());
        let (fid, sid, menu_id) = seed(&svc, &app).await;
        let token = diner_token(&app, "fay").await;

        let (status, body) = call(&app, "POST", "/order", Some(&token), Some(order_body(fid, sid, menu_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jwt"], "factory.pizza.jwt");
        assert_eq!(body["order"]["items"][0]["id"], 1);

        let (status, page) = call(&app, "GET", "/order?page=1", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["page"], 1);
        assert_eq!(page["orders"].as_array().unwrap().len(), 1);
        assert_eq!(page["orders"][0]["id"], body["order"]["id"]);
    }

    #[tokio::test]
    async fn test_factory_failure_is_500() {
        let (svc, _dir) = service_with(StubFactory::failing());
        let app = build_router(svc.clone());
        let (fid, sid, menu_id) = seed(&svc, &app).await;
        let token = diner_token(&app, "gus").await;

        let (status, body) = call(&app, "POST", "/order", Some(&token), Some(order_body(fid, sid, menu_id))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "INTERNAL");
        assert_eq!(body["message"], "Failed to fulfill order at factory");
        assert_eq!(body["followLinkToEndChaos"], "https://factory.test/report");

        let (_, page) = call(&app, "GET", "/order", Some(&token), None).await;
        assert_eq!(page["orders"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_order_rejections() {
        let (svc, _dir) = service();
        let app = build_router(svc.clone());
        let (fid, sid, menu_id) = seed(&svc, &app).await;
        let token = diner_token(&app, "hal").await;

        let (status, _) = call(&app, "POST", "/order", None, Some(order_body(fid, sid, menu_id))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let empty = json!({"franchiseId": fid, "storeId": sid, "items": []});
        let (status, _) = call(&app, "POST", "/order", Some(&token), Some(empty)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(&app, "POST", "/order", Some(&token), Some(json!({"items": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");

        let wrong_type = json!({"franchiseId": "one", "storeId": sid, "items": []});
        let (status, body) = call(&app, "POST", "/order", Some(&token), Some(wrong_type)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");

        let (status, body) = call(&app, "GET", "/order?page=abc", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");

        let (status, _) = call(&app, "POST", "/order", Some(&token), Some(order_body(fid, sid, menu_id + 100))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, "POST", "/order", Some(&token), Some(order_body(fid + 1, sid, menu_id))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
