use std::sync::Arc;

use super::{config::Config, store::Store};

pub struct AppState {
    pub config: Config,
    pub store: Store,
}

impl AppState {
    pub async fn new() -> Arc<Self> {
        let config = Config::load();
        let store = Store::load(&config).await;

        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Store) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
