//! JWT Pizza: user accounts, menu, orders, and franchises behind a REST API.
//!
//! - `model`: stored records, request bodies and response views
//! - `service`: `PizzaService`, the business rules over KV storage
//! - `api`: axum handlers, nested by the server under `/api`
//! - `factory`: client for the external service that fulfils orders

pub mod api;
pub mod factory;
pub mod model;
pub mod service;
pub mod store_impls;

use std::sync::Arc;

use axum::Router;

use pizza_core::Module;

pub use factory::{Factory, HttpFactory};
pub use service::{PizzaConfig, PizzaService};

/// The pizza module, mounted by the server at `/api`.
pub struct PizzaModule {
    service: Arc<PizzaService>,
}

impl PizzaModule {
    pub fn new(service: Arc<PizzaService>) -> Self {
        Self { service }
    }
}

impl Module for PizzaModule {
    fn name(&self) -> &str {
        "api"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
