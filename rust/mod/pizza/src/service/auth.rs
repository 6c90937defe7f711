use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, info};

use pizza_core::{new_id, ServiceError};
use pizza_store::storage_error;

use crate::model::{
    AuthResponse, AuthUser, Claims, LoginRequest, RegisterRequest, Session, User, UserRecord,
    UserRole,
};
use crate::service::PizzaService;

const SESSION_PREFIX: &str = "pizza:session:";

fn session_key(sid: &str) -> String {
    format!("{}{}", SESSION_PREFIX, sid)
}

fn unauthorized() -> ServiceError {
    ServiceError::Unauthorized("unauthorized".into())
}

impl PizzaService {
    /// Register a new diner and log them in.
    pub fn register(&self, input: RegisterRequest) -> Result<AuthResponse, ServiceError> {
        let name = input.name.trim();
        let email = input.email.trim();
        if name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(ServiceError::Validation(
                "name, email, and password are required".into(),
            ));
        }

        let record = self.create_user(name, email, &input.password, vec![UserRole::diner()])?;
        let token = self.issue_token(&record)?;
        info!(user_id = record.id, "registered user");

        Ok(AuthResponse {
            user: User::from(&record),
            token: Some(token),
        })
    }

    /// Log in with email and password.
    ///
    /// Unknown email and wrong password are indistinguishable: both are
    /// NotFound.
    pub fn login(&self, input: LoginRequest) -> Result<AuthResponse, ServiceError> {
        let unknown = || ServiceError::NotFound("unknown user".into());

        let record = self
            .find_user_by_email(&input.email)?
            .ok_or_else(unknown)?;
        if !crate::store_impls::verify_password(&input.password, &record.password_hash) {
            debug!(user_id = record.id, "login rejected: bad password");
            return Err(unknown());
        }

        let token = self.issue_token(&record)?;
        info!(user_id = record.id, "user logged in");
        Ok(AuthResponse {
            user: User::from(&record),
            token: Some(token),
        })
    }

    /// End the caller's session. The token stops working immediately.
    pub fn logout(&self, caller: &AuthUser) -> Result<(), ServiceError> {
        self.sessions
            .delete(&session_key(&caller.sid))
            .map_err(storage_error)?;
        info!(user_id = caller.id, "user logged out");
        Ok(())
    }

    /// Sign a JWT for a user and open its session.
    pub fn issue_token(&self, user: &UserRecord) -> Result<String, ServiceError> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(self.config.token_ttl);

        let session = Session {
            id: new_id(),
            user_id: user.id,
            issued_at: now.to_rfc3339(),
            expires_at: exp.to_rfc3339(),
        };

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
            sid: session.id.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::Internal(format!("JWT encode failed: {}", e)))?;

        let data = serde_json::to_vec(&session)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        self.sessions
            .set(&session_key(&session.id), &data)
            .map_err(storage_error)?;

        Ok(token)
    }

    /// Resolve a bearer token to its caller.
    ///
    /// Fails with Unauthorized when the token is malformed, expired, signed
    /// with another key, or its session has ended.
    pub fn authenticate(&self, token: &str) -> Result<AuthUser, ServiceError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            debug!("rejected token: {}", e);
            unauthorized()
        })?;
        let claims = token_data.claims;

        let session: Session = match self
            .sessions
            .get(&session_key(&claims.sid))
            .map_err(storage_error)?
        {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ServiceError::Internal(e.to_string()))?,
            None => return Err(unauthorized()),
        };

        if session.is_expired(chrono::Utc::now()) {
            self.sessions
                .delete(&session_key(&session.id))
                .map_err(storage_error)?;
            return Err(unauthorized());
        }

        let user_id: u64 = claims.sub.parse().map_err(|_| unauthorized())?;
        if session.user_id != user_id {
            return Err(unauthorized());
        }

        let record = self.users.get(user_id)?.ok_or_else(unauthorized)?;
        Ok(AuthUser {
            id: record.id,
            name: record.name,
            email: record.email,
            roles: record.roles,
            sid: claims.sid,
        })
    }

    /// Delete sessions whose tokens have expired. Returns how many were
    /// removed.
    pub fn prune_expired_sessions(&self) -> Result<usize, ServiceError> {
        let now = chrono::Utc::now();
        let mut removed = 0;
        for (key, bytes) in self.sessions.scan(SESSION_PREFIX).map_err(storage_error)? {
            let expired = serde_json::from_slice::<Session>(&bytes)
                .map(|s| s.is_expired(now))
                .unwrap_or(true);
            if expired {
                self.sessions.delete(&key).map_err(storage_error)?;
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "pruned expired sessions");
        }
        Ok(removed)
    }

    /// Number of stored sessions.
    pub fn session_count(&self) -> Result<usize, ServiceError> {
        Ok(self
            .sessions
            .scan(SESSION_PREFIX)
            .map_err(storage_error)?
            .len())
    }
}
