use shared_config::AppConfig;

use crate::clinic::ClinicStore;

/// Shared axum state: configuration plus the store handle. Unlike a
/// per-request REST client, the store is stateful and must be constructed
/// once and shared.
#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub store: ClinicStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: ClinicStore::new(),
        }
    }
}
