use serde::{Deserialize, Serialize};

/// A stored franchise. Stores reference it through `Store::franchise_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Franchise {
    pub id: u64,
    pub name: String,
    /// Users holding the franchisee role for this franchise, in grant order.
    #[serde(default)]
    pub admin_ids: Vec<u64>,
    pub created_at: String,
}

/// A store belonging to exactly one franchise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: u64,
    pub franchise_id: u64,
    pub name: String,
}

/// Body of `POST /api/franchise`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFranchise {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub admins: Vec<AdminRef>,
}

/// Franchise admin named by email.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminRef {
    pub email: String,
}

/// Body of `POST /api/franchise/:id/store`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStore {
    #[serde(default)]
    pub name: String,
}

/// Franchise as returned by the API. `admins` and store revenue are only
/// present for callers allowed to audit franchises, or for a franchise's
/// own admins.
#[derive(Debug, Clone, Serialize)]
pub struct FranchiseView {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admins: Option<Vec<FranchiseAdmin>>,
    pub stores: Vec<StoreView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FranchiseAdmin {
    pub id: u64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreView {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<f64>,
}

/// One page of franchises.
#[derive(Debug, Clone, Serialize)]
pub struct FranchiseList {
    pub franchises: Vec<FranchiseView>,
    pub more: bool,
}
