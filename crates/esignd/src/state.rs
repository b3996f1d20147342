use std::sync::Arc;

use esign_core::config::ProviderConfig;
use esign_engine::store::SignatureStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SignatureStore>,
    /// Process-level provider configuration (CLI overrides already
    /// resolved over the environment layer). Per-request settings are
    /// layered on top at the call site.
    pub config: ProviderConfig,
}

impl AppState {
    pub fn new(store: Arc<SignatureStore>, config: ProviderConfig) -> Self {
        Self { store, config }
    }
}
