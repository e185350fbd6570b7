// src/bootstrap.rs
use crate::api::AppState;
use crate::config::{AppConfig, Backend};
use crate::store::dynamo::DynamoNewsStore;
use crate::store::memory::MemoryNewsStore;
use crate::store::NewsStore;
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the shared state once, before serving. Any failure here is meant
/// to abort startup.
pub async fn init_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn NewsStore> = match cfg.backend {
        Backend::Dynamodb => {
            let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let store = DynamoNewsStore::new(&sdk_config, cfg.dynamo_settings())
                .context("initializing DynamoDB store")?;
            // Safe diagnostics only: no credentials.
            info!(
                table = store.table_name(),
                region = ?cfg.region,
                endpoint = ?cfg.endpoint,
                timeout_ms = ?cfg.timeout_ms,
                "DynamoDB store ready"
            );
            Arc::new(store)
        }
        Backend::Memory => {
            let path = cfg
                .fixtures_path
                .as_deref()
                .context("memory backend requires fixtures_path")?;
            let store = MemoryNewsStore::from_fixture(path)?;
            if store.is_empty() {
                warn!(path = %path.display(), "memory store seeded with no items");
            }
            info!(items = store.len(), "memory store ready");
            Arc::new(store)
        }
    };

    Ok(AppState::new(store, cfg.page_limits()))
}
