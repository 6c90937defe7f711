//! Bootstrap: first-start checks and the configured admin account.
//!
//! When pizzad starts:
//! 1. Verify the config has a JWT secret and a data dir; refuse to start otherwise.
//! 2. Ensure the configured admin user exists.

use pizza::model::UserRole;
use pizza::PizzaService;
use tracing::info;

use crate::config::{AdminConfig, ServerConfig};

/// Verify server configuration is usable.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.jwt.expire_secs <= 0 {
        anyhow::bail!("JWT expire_secs must be positive.");
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    if config.orders.page_size == 0 {
        anyhow::bail!("Orders page_size must be positive.");
    }
    Ok(())
}

/// Ensure the configured admin account exists. Creates it if its email is
/// unknown; an existing account is left untouched.
pub fn ensure_admin(svc: &PizzaService, admin: &AdminConfig) -> anyhow::Result<()> {
    if admin.email.is_empty() {
        info!("No default admin configured");
        return Ok(());
    }
    if admin.password.is_empty() {
        anyhow::bail!("Admin password is empty in configuration.");
    }

    let name = if admin.name.is_empty() { "admin" } else { admin.name.as_str() };
    if svc.ensure_user(name, &admin.email, &admin.password, UserRole::admin())? {
        info!("Created admin user {}", admin.email);
    } else {
        info!("Admin user {} already exists", admin.email);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FactoryConfig, JwtConfig, OrdersConfig, StorageConfig};

    fn config() -> ServerConfig {
        ServerConfig {
            jwt: JwtConfig {
                secret: "test".to_string(),
                expire_secs: 3600,
            },
            storage: StorageConfig {
                data_dir: "/tmp".to_string(),
            },
            factory: FactoryConfig::default(),
            orders: OrdersConfig::default(),
            admin: AdminConfig::default(),
        }
    }

    #[test]
    fn test_verify_config() {
        assert!(verify_config(&config()).is_ok());

        let mut c = config();
        c.jwt.secret.clear();
        assert!(verify_config(&c).is_err());

        let mut c = config();
        c.storage.data_dir.clear();
        assert!(verify_config(&c).is_err());

        let mut c = config();
        c.orders.page_size = 0;
        assert!(verify_config(&c).is_err());
    }

    #[test]
    fn test_ensure_admin_is_idempotent() {
        let (svc, _dir) = crate::routes::tests::service();
        let admin = crate::routes::tests::admin_config();

        ensure_admin(&svc, &admin).unwrap();
        ensure_admin(&svc, &admin).unwrap();

        let user = svc.find_user_by_email("root@jwt.com").unwrap().unwrap();
        assert_eq!(user.roles, vec![UserRole::admin()]);
    }

    #[test]
    fn test_no_admin_section_creates_no_account() {
        let (svc, _dir) = crate::routes::tests::service();
        ensure_admin(&svc, &AdminConfig::default()).unwrap();
        assert!(svc.find_user_by_email("a@jwt.com").unwrap().is_none());
        assert!(svc.find_user_by_email("admin").unwrap().is_none());
    }

    #[test]
    fn test_admin_without_password_refused() {
        let (svc, _dir) = crate::routes::tests::service();
        let admin = AdminConfig {
            password: String::new(),
            ..crate::routes::tests::admin_config()
        };
        assert!(ensure_admin(&svc, &admin).is_err());
    }
}
