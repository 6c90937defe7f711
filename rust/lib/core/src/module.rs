use axum::Router;

/// A service module that contributes HTTP routes.
///
/// The binary entry point collects all modules and nests each one's
/// router under `/{name}`.
pub trait Module: Send + Sync {
    /// Module name, used for logging and as the route prefix.
    fn name(&self) -> &str;

    /// Return the module's routes, to be nested under `/{name}`.
    fn routes(&self) -> Router;
}
