use tracing::info;

use pizza_core::{ListParams, ServiceError};

use crate::model::{AuthResponse, AuthUser, Permission, UpdateUser, User, UserList, UserRecord, UserRole};
use crate::service::{name_matches, PizzaService};
use crate::store_impls::hash_password;

const EMAIL_INDEX: &str = "user_email";

fn validate_email(email: &str) -> Result<(), ServiceError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ServiceError::Validation(format!("invalid email '{}'", email))),
    }
}

impl PizzaService {
    /// Create a user with the given roles. Emails are unique ignoring case.
    pub(crate) fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        roles: Vec<UserRole>,
    ) -> Result<UserRecord, ServiceError> {
        validate_email(email)?;
        if self.lookup_unique(EMAIL_INDEX, email)?.is_some() {
            return Err(ServiceError::Conflict(format!("email '{}' is already registered", email)));
        }

        let password_hash = hash_password(password)
            .map_err(|e| ServiceError::Internal(format!("password hash failed: {}", e)))?;
        let record = self.users.save_new(UserRecord {
            id: 0,
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            roles,
            created_at: String::new(),
            updated_at: String::new(),
        })?;

        // Lost a race with a concurrent registration of the same email.
        if !self.claim_unique(EMAIL_INDEX, email, record.id)? {
            self.users.delete(record.id)?;
            return Err(ServiceError::Conflict(format!("email '{}' is already registered", email)));
        }

        Ok(record)
    }

    /// Create a user unless the email is already registered.
    /// Returns true if a user was created.
    pub fn ensure_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<bool, ServiceError> {
        if self.find_user_by_email(email)?.is_some() {
            return Ok(false);
        }
        let record = self.create_user(name, email, password, vec![role])?;
        info!(user_id = record.id, "created user {}", email);
        Ok(true)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, ServiceError> {
        match self.lookup_unique(EMAIL_INDEX, email)? {
            Some(id) => self.users.get(id),
            None => Ok(None),
        }
    }

    pub fn get_user(&self, id: u64) -> Result<User, ServiceError> {
        let record = self
            .users
            .get(id)?
            .ok_or_else(|| ServiceError::NotFound("unknown user".into()))?;
        Ok(User::from(&record))
    }

    /// Update a user's profile. Callers may update themselves; updating
    /// anyone else takes user management rights.
    ///
    /// A fresh token is returned only when callers update themselves.
    pub fn update_user(
        &self,
        caller: &AuthUser,
        id: u64,
        input: UpdateUser,
    ) -> Result<AuthResponse, ServiceError> {
        let is_self = caller.id == id;
        if is_self {
            caller.require(Permission::UpdateOwnProfile, "update user")?;
        } else {
            caller.require(Permission::ManageUsers, "update user")?;
        }

        let mut record = self
            .users
            .get(id)?
            .ok_or_else(|| ServiceError::NotFound("unknown user".into()))?;

        if let Some(name) = input.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServiceError::Validation("name must not be empty".into()));
            }
            record.name = name.to_string();
        }

        if let Some(password) = input.password {
            if password.is_empty() {
                return Err(ServiceError::Validation("password must not be empty".into()));
            }
            record.password_hash = hash_password(&password)
                .map_err(|e| ServiceError::Internal(format!("password hash failed: {}", e)))?;
        }

        let mut claimed_email = None;
        let mut released_email = None;
        if let Some(email) = input.email {
            let email = email.trim().to_string();
            validate_email(&email)?;
            let changed = Self::index_key(EMAIL_INDEX, &email)
                != Self::index_key(EMAIL_INDEX, &record.email);
            if changed {
                if !self.claim_unique(EMAIL_INDEX, &email, record.id)? {
                    return Err(ServiceError::Conflict(format!(
                        "email '{}' is already registered",
                        email
                    )));
                }
                claimed_email = Some(email.clone());
                released_email = Some(record.email.clone());
            }
            record.email = email;
        }

        let record = match self.users.save(record) {
            Ok(record) => record,
            Err(e) => {
                if let Some(email) = claimed_email {
                    self.release_unique(EMAIL_INDEX, &email)?;
                }
                return Err(e);
            }
        };
        if let Some(old) = released_email {
            self.release_unique(EMAIL_INDEX, &old)?;
        }
        info!(user_id = id, updated_by = caller.id, "updated user");

        let token = if is_self {
            Some(self.issue_token(&record)?)
        } else {
            None
        };
        Ok(AuthResponse {
            user: User::from(&record),
            token,
        })
    }

    /// List users, optionally filtered by name.
    pub fn list_users(&self, caller: &AuthUser, params: &ListParams) -> Result<UserList, ServiceError> {
        caller.require(Permission::ManageUsers, "list users")?;
        let pattern = params.name.as_deref();
        let all: Vec<User> = self
            .users
            .list_where(|u| name_matches(pattern, &u.name))?
            .iter()
            .map(User::from)
            .collect();
        let page = params.paginate(all);
        Ok(UserList {
            users: page.items,
            more: page.more,
        })
    }

    /// Add a role to a user unless already held.
    pub(crate) fn grant_role(&self, user_id: u64, role: UserRole) -> Result<(), ServiceError> {
        let mut record = self.users.get_or_err(user_id)?;
        if !record.roles.contains(&role) {
            record.roles.push(role);
            self.users.save(record)?;
        }
        Ok(())
    }

    /// Remove a role from a user. Missing users are ignored.
    pub(crate) fn revoke_role(&self, user_id: u64, role: &UserRole) -> Result<(), ServiceError> {
        if let Some(mut record) = self.users.get(user_id)? {
            let before = record.roles.len();
            record.roles.retain(|r| r != role);
            if record.roles.len() != before {
                self.users.save(record)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LoginRequest;
    use crate::service::testing::{admin, diner, service};

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("ab.com").is_err());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@").is_err());
    }

    #[test]
    fn test_self_update_issues_new_token() {
        let (svc, _dir) = service();
        let me = diner(&svc, "carol");

        let resp = svc
            .update_user(&me, me.id, UpdateUser {
                name: Some("Carol W.".into()),
                email: Some("carol.w@jwt.com".into()),
                password: Some("newpass".into()),
            })
            .unwrap();
        assert_eq!(resp.user.name, "Carol W.");
        assert!(resp.token.is_some());

        // Old email is free again, new credentials work.
        assert!(svc.find_user_by_email("carol@jwt.com").unwrap().is_none());
        svc.login(LoginRequest { email: "carol.w@jwt.com".into(), password: "newpass".into() })
            .unwrap();
    }

    #[test]
    fn test_update_other_user_requires_admin() {
        let (svc, _dir) = service();
        let alice = diner(&svc, "alice");
        let bob = diner(&svc, "bob");

        let err = svc
            .update_user(&alice, bob.id, UpdateUser { name: Some("x".into()), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied(_)));

        let root = admin(&svc);
        let resp = svc
            .update_user(&root, bob.id, UpdateUser { name: Some("Robert".into()), ..Default::default() })
            .unwrap();
        assert_eq!(resp.user.name, "Robert");
        assert!(resp.token.is_none());
    }

    #[test]
    fn test_update_validation() {
        let (svc, _dir) = service();
        let me = diner(&svc, "dave");

        let empty_name = UpdateUser { name: Some("  ".into()), ..Default::default() };
        assert!(matches!(svc.update_user(&me, me.id, empty_name), Err(ServiceError::Validation(_))));

        let bad_email = UpdateUser { email: Some("nope".into()), ..Default::default() };
        assert!(matches!(svc.update_user(&me, me.id, bad_email), Err(ServiceError::Validation(_))));

        let empty_pw = UpdateUser { password: Some(String::new()), ..Default::default() };
        assert!(matches!(svc.update_user(&me, me.id, empty_pw), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_update_to_taken_email_conflicts() {
        let (svc, _dir) = service();
        let erin = diner(&svc, "erin");
        diner(&svc, "frank");
        let err = svc
            .update_user(&erin, erin.id, UpdateUser { email: Some("frank@jwt.com".into()), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn test_case_only_email_change_keeps_ownership() {
        let (svc, _dir) = service();
        let me = diner(&svc, "élodie");

        let resp = svc
            .update_user(&me, me.id, UpdateUser { email: Some("ÉLODIE@jwt.com".into()), ..Default::default() })
            .unwrap();
        assert_eq!(resp.user.email, "ÉLODIE@jwt.com");

        // The index entry still belongs to the same user.
        let found = svc.find_user_by_email("élodie@jwt.com").unwrap().unwrap();
        assert_eq!(found.id, me.id);
        let err = svc
            .register(crate::model::RegisterRequest {
                name: "other".into(),
                email: "élodie@jwt.com".into(),
                password: "pw".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn test_admin_updating_missing_user_is_not_found() {
        let (svc, _dir) = service();
        let root = admin(&svc);
        let err = svc.update_user(&root, 999, UpdateUser::default()).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_list_users() {
        let (svc, _dir) = service();
        diner(&svc, "gina");
        diner(&svc, "gary");
        diner(&svc, "hank");
        let root = admin(&svc);

        let params = ListParams { name: Some("g*".into()), ..Default::default() };
        let list = svc.list_users(&root, &params).unwrap();
        assert_eq!(list.users.len(), 2);
        assert!(!list.more);

        let gina = svc.find_user_by_email("gina@jwt.com").unwrap().unwrap();
        let caller = svc.authenticate(&svc.issue_token(&gina).unwrap()).unwrap();
        assert!(matches!(svc.list_users(&caller, &params), Err(ServiceError::PermissionDenied(_))));
    }

    #[test]
    fn test_ensure_user_is_idempotent() {
        let (svc, _dir) = service();
        assert!(svc.ensure_user("A", "a@jwt.com", "pw", UserRole::admin()).unwrap());
        assert!(!svc.ensure_user("A", "a@jwt.com", "pw", UserRole::admin()).unwrap());
    }
}
