use serde::{Deserialize, Serialize};

use pizza_core::ServiceError;

use super::{Permission, UserRole};

/// A live login session. Exists from token issuance until logout; a JWT
/// whose `sid` has no session is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session id (UUIDv4, no dashes).
    pub id: String,

    /// User id that owns this session.
    pub user_id: u64,

    /// RFC 3339 timestamp when the token was issued.
    pub issued_at: String,

    /// RFC 3339 timestamp when the token expires.
    pub expires_at: String,
}

impl Session {
    /// Whether the session has ended by `now`. Unreadable timestamps count
    /// as expired.
    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        match chrono::DateTime::parse_from_rfc3339(&self.expires_at) {
            Ok(expires_at) => expires_at <= now,
            Err(_) => true,
        }
    }
}

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,

    /// User display name.
    pub name: String,

    pub email: String,

    /// Roles held when the token was issued.
    #[serde(default)]
    pub roles: Vec<UserRole>,

    /// Session id (for logout).
    pub sid: String,

    /// Issued at (unix timestamp).
    pub iat: i64,

    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// The authenticated caller of a request.
///
/// Roles come from the stored user at request time, so a role granted
/// after login (e.g. franchisee) takes effect without re-login.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub roles: Vec<UserRole>,
    /// Session id the presented token is bound to.
    pub sid: String,
}

impl AuthUser {
    pub fn can(&self, permission: Permission) -> bool {
        self.roles.iter().any(|r| r.grants(permission))
    }

    /// Fail with 403 unless some held role grants `permission`.
    pub fn require(&self, permission: Permission, action: &str) -> Result<(), ServiceError> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(ServiceError::PermissionDenied(format!("unable to {}", action)))
        }
    }
}
