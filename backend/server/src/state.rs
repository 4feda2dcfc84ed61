use std::sync::Arc;

use ledger::Record;
use tracing::{info, warn};

use crate::{
    config::Config,
    database::RedisStore,
    error::AppError,
    import::Enrichment,
    store::{MemoryStore, Repository, Store},
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub enrichment: Option<Enrichment>,
}

impl AppState {
    pub async fn new() -> Result<Arc<Self>, AppError> {
        let config = Config::load().map_err(|e| AppError::Internal(e.to_string()))?;

        let store: Arc<dyn Store> = match &config.redis_url {
            Some(url) => Arc::new(RedisStore::connect(url).await?),
            None => {
                warn!("REDIS_URL not set, records will not survive a restart");
                Arc::new(MemoryStore::new())
            }
        };

        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Arc<dyn Store>) -> Result<Arc<Self>, AppError> {
        let enrichment = match &config.ai_engine_url {
            Some(url) => {
                info!("CSV enrichment enabled via {url}");
                Some(
                    Enrichment::new(url, config.ai_engine_timeout)
                        .map_err(|e| AppError::Internal(e.to_string()))?,
                )
            }
            None => None,
        };

        Ok(Arc::new(Self {
            config,
            store,
            enrichment,
        }))
    }

    pub fn repo<T: Record>(&self) -> Repository<T> {
        Repository::new(Arc::clone(&self.store))
    }
}
