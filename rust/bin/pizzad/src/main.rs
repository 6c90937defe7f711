//! `pizzad`: the JWT Pizza server binary.
//!
//! Usage:
//!   pizzad -c <config-name-or-path> [--listen <addr>]
//!
//! The config name resolves to `/etc/pizza/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use pizza::{HttpFactory, PizzaConfig, PizzaModule, PizzaService};
use pizza_core::Module;
use tracing::{info, warn};

use config::ServerConfig;

/// How often expired sessions are swept from the session store.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// JWT Pizza server.
#[derive(Parser, Debug)]
#[command(name = "pizzad", about = "JWT Pizza server")]
struct Cli {
    /// Config name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:3000")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = pizza_core::ServiceConfig {
        data_dir: Some(data_dir),
        listen: cli.listen.clone(),
        ..Default::default()
    };

    let kv: Arc<dyn pizza_kv::KVStore> = Arc::new(
        pizza_kv::RedbStore::open(&core_config.resolve_db_path())
            .map_err(|e| anyhow::anyhow!("failed to open KV store: {}", e))?,
    );
    // Sessions live only as long as the process.
    let sessions: Arc<dyn pizza_kv::KVStore> = Arc::new(pizza_kv::MemoryStore::new());

    if server_config.factory.url.is_empty() {
        warn!("No factory url configured; orders will not be fulfilled");
    }
    let factory = Arc::new(HttpFactory::new(
        server_config.factory.url.clone(),
        server_config.factory.api_key.clone(),
    ));

    let pizza_config = PizzaConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        token_ttl: server_config.jwt.expire_secs,
        order_page_size: server_config.orders.page_size,
        factory_url: server_config.factory.url.clone(),
    };
    let service = PizzaService::new(kv, sessions, factory, pizza_config);

    bootstrap::ensure_admin(&service, &server_config.admin)?;
    spawn_session_sweeper(service.clone());

    let pizza_module = PizzaModule::new(service);
    info!("Pizza module initialized");

    let app = routes::build_router(vec![(pizza_module.name(), pizza_module.routes())]);

    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("JWT Pizza server listening on {}", core_config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drop sessions whose tokens have expired.
fn spawn_session_sweeper(service: Arc<PizzaService>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = service.prune_expired_sessions() {
                warn!("session sweep failed: {}", e);
            }
        }
    });
}
