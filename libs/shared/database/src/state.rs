use std::sync::Arc;

use tracing::{info, warn};

use shared_config::AppConfig;
use shared_utils::clock::{Clock, SystemClock};

use crate::memory::InMemoryStore;
use crate::store::ClinicStore;
use crate::supabase::SupabaseStore;

/// Shared state handed to every cell router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ClinicStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn ClinicStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            clock,
        }
    }

    /// Picks Supabase when it is configured, otherwise a process-local store.
    pub fn from_config(config: AppConfig) -> Self {
        let store: Arc<dyn ClinicStore> = if config.is_configured() {
            info!("Using Supabase store at {}", config.supabase_url);
            Arc::new(SupabaseStore::new(&config))
        } else {
            warn!("Using in-memory store - data is lost on restart");
            Arc::new(InMemoryStore::new())
        };

        Self::new(config, store, Arc::new(SystemClock))
    }
}
