use serde::{Deserialize, Serialize};

/// An item on the global menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Image file name or URL.
    #[serde(default)]
    pub image: String,
    pub price: f64,
}

/// Body of `PUT /api/order/menu`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddMenuItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub price: f64,
}
