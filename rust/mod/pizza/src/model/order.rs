use serde::{Deserialize, Serialize};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: u64,
    pub diner_id: u64,
    pub franchise_id: u64,
    pub store_id: u64,
    /// RFC 3339 timestamp when the order was placed.
    pub date: String,
    pub items: Vec<OrderItem>,
}

/// One line of an order. `id` is the line's position, starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub id: u64,
    pub menu_id: u64,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

/// Body of `POST /api/order`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub franchise_id: u64,
    pub store_id: u64,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub menu_id: u64,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

/// Query of `GET /api/order`. Pages start at 1.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderQuery {
    #[serde(default = "first_page")]
    pub page: usize,
}

fn first_page() -> usize {
    1
}

/// Response of `GET /api/order`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub diner_id: u64,
    pub orders: Vec<Order>,
    pub page: usize,
}

/// Response of a fulfilled `POST /api/order`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_link_to_end_chaos: Option<String>,
    /// Verifiable pizza token issued by the factory.
    pub jwt: String,
}
