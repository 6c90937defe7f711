use serde::{Deserialize, Serialize};

/// The three account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Diner,
    Franchisee,
    Admin,
}

/// A role held by a user. Franchisee roles are scoped to one franchise
/// through `object_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRole {
    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<u64>,
}

impl UserRole {
    pub fn diner() -> Self {
        Self { role: Role::Diner, object_id: None }
    }

    pub fn admin() -> Self {
        Self { role: Role::Admin, object_id: None }
    }

    pub fn franchisee(franchise_id: u64) -> Self {
        Self { role: Role::Franchisee, object_id: Some(franchise_id) }
    }

    /// Whether this role grants the given permission.
    pub fn grants(&self, permission: Permission) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Franchisee => match permission {
                Permission::ManageFranchise(id) => self.object_id == Some(id),
                other => DINER_PERMISSIONS.contains(&other),
            },
            Role::Diner => DINER_PERMISSIONS.contains(&permission),
        }
    }
}

/// Capabilities checked per route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    PlaceOrder,
    ListOwnOrders,
    UpdateOwnProfile,
    ManageMenu,
    ManageUsers,
    CreateFranchise,
    DeleteFranchise,
    /// Create and delete stores of one franchise.
    ManageFranchise(u64),
    /// See franchise admins, revenue, and other users' franchises.
    AuditFranchises,
}

const DINER_PERMISSIONS: &[Permission] = &[
    Permission::PlaceOrder,
    Permission::ListOwnOrders,
    Permission::UpdateOwnProfile,
];
