//! Application state shared across handlers.

use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::gateway::{LcdGateway, QueryGateway};
use crate::latest::{LatestSlot, Ticket};
use crate::metrics::METRICS;
use crate::pipeline::{self, NftSlot};
use nft_gallery_types::{parse_descriptors, CollectionDescriptor};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub gateway: Arc<dyn QueryGateway>,
    /// Concrete LCD gateway, when the service talks to a real node.
    pub lcd: Option<Arc<LcdGateway>>,
    pub descriptors: Vec<CollectionDescriptor>,
    pub catalog: LatestSlot<Vec<NftSlot>>,
    pub checkout: Option<CatalogClient>,
    pub start_time: Instant,
    pub request_count: AtomicU64,
}

impl AppState {
    /// Create application state from configuration.
    pub fn new(config: Config) -> Result<Self, crate::Error> {
        let lcd = Arc::new(LcdGateway::new(
            &config.rest_url,
            config.fallback_url(),
            Duration::from_millis(config.request_timeout_ms),
        )?);

        let raw = std::fs::read_to_string(&config.collections_path).map_err(|e| {
            crate::Error::Config(format!(
                "Failed to read collections from {}: {e}",
                config.collections_path
            ))
        })?;
        let descriptors = parse_descriptors(&raw).map_err(|e| crate::Error::Config(e.to_string()))?;
        info!(count = descriptors.len(), path = %config.collections_path, "Loaded collection descriptors");

        let mut state = Self::with_gateway(config, lcd.clone(), descriptors)?;
        state.lcd = Some(lcd);
        Ok(state)
    }

    /// State over an arbitrary gateway; no LCD health probing.
    pub fn with_gateway(
        config: Config,
        gateway: Arc<dyn QueryGateway>,
        descriptors: Vec<CollectionDescriptor>,
    ) -> Result<Self, crate::Error> {
        let checkout = match config.crossmint_api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Some(CatalogClient::new(
                &config.crossmint_base_url,
                &config.crossmint_collection_id,
                key,
                Duration::from_millis(config.request_timeout_ms),
            )?),
            None => None,
        };

        Ok(Self {
            config,
            gateway,
            lcd: None,
            descriptors,
            catalog: LatestSlot::new(),
            checkout,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
        })
    }

    /// Re-run the contract listing and offer the result to the catalog slot.
    ///
    /// Always returns this invocation's own result; the shared snapshot only
    /// changes if no newer refresh began while this one was running.
    pub async fn refresh_catalog(&self) -> Result<(Ticket, Vec<NftSlot>), crate::Error> {
        let ticket = self.catalog.begin();
        let start = Instant::now();
        let result = pipeline::fetch_catalog(
            self.gateway.as_ref(),
            &self.config.contract_address,
            self.config.page_limit,
        )
        .await;
        METRICS.record_pipeline_duration(start);

        let slots = result?;
        let ready = slots.iter().filter(|slot| slot.is_ready()).count();
        if self.catalog.commit(ticket, slots.clone()) {
            info!(
                ticket = ticket.get(),
                tokens = slots.len(),
                ready,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Catalog refreshed"
            );
        }
        Ok((ticket, slots))
    }

    /// The user-data contract, or `NotFound` when none is configured.
    pub fn user_data_contract(&self) -> Result<&str, crate::Error> {
        self.config
            .user_data_contract
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| crate::Error::NotFound("no user-data contract configured".into()))
    }
}
