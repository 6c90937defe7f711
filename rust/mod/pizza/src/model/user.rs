use serde::{Deserialize, Serialize};

use super::UserRole;

/// A stored user account, including the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,

    pub name: String,

    /// Email as given at registration (trimmed).
    pub email: String,

    /// Argon2id PHC string.
    pub password_hash: String,

    /// Roles in grant order.
    #[serde(default)]
    pub roles: Vec<UserRole>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub roles: Vec<UserRole>,
}

impl From<&UserRecord> for User {
    fn from(rec: &UserRecord) -> Self {
        Self {
            id: rec.id,
            name: rec.name.clone(),
            email: rec.email.clone(),
            roles: rec.roles.clone(),
        }
    }
}

/// Body of `POST /api/auth`. Missing fields deserialize as empty and are
/// rejected by validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `PUT /api/auth`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `PUT /api/user/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// `{user, token}` returned by register, login and profile updates.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// One page of users.
#[derive(Debug, Clone, Serialize)]
pub struct UserList {
    pub users: Vec<User>,
    pub more: bool,
}
