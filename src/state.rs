use std::sync::Arc;

use crate::auth::AuthHandle;
use crate::backend::{self, BackendClients};
use crate::config::AppConfig;
use crate::error::StartupError;
use crate::router::RouteTable;

/// Shared, read-only application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<BackendClients>,
    pub auth: Arc<AuthHandle>,
    pub routes: Arc<RouteTable>,
}

impl AppState {
    /// Build every process-wide handle from configuration
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let backend = backend::initialize_with(&config.backend, &config.endpoints)?;
        let auth = AuthHandle::new(&config.auth, &config.backend.project_id);
        let routes = RouteTable::standard().validate()?;

        if !auth.is_initialized() {
            tracing::warn!("No token secret or signing keys configured; protected routes will redirect every request");
        }

        Ok(Self::new(config, backend, auth, routes))
    }

    /// Assemble state from already-built parts (tests substitute fakes here)
    pub fn new(config: AppConfig, backend: BackendClients, auth: AuthHandle, routes: RouteTable) -> Self {
        Self {
            config: Arc::new(config),
            backend: Arc::new(backend),
            auth: Arc::new(auth),
            routes: Arc::new(routes),
        }
    }
}
