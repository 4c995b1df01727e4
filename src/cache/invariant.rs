use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    catalog::{CatalogCache, CatalogEntry},
    CacheError,
};
use crate::{
    config::MarketCacheConfig,
    fetcher::{FetchError, MarketDescriptionFetcher},
    market::MarketDescription,
    specifiers::Specifiers,
};

#[async_trait]
impl CatalogEntry for MarketDescription {
    type Key = i64;

    const CATALOG: &'static str = "invariant_markets";

    fn key(&self) -> i64 {
        self.id()
    }

    fn merge(&mut self, other: MarketDescription) {
        MarketDescription::merge(self, other)
    }

    async fn fetch(
        fetcher: &dyn MarketDescriptionFetcher,
        culture: &str,
    ) -> Result<Vec<MarketDescription>, FetchError> {
        let markets = fetcher.fetch_invariant_market_descriptions(culture).await?;
        Ok(markets
            .into_iter()
            .map(|dto| MarketDescription::from_dto(culture, dto))
            .collect())
    }
}

/// The full market catalog, loaded per culture.
pub struct InvariantMarketCache {
    catalog: Arc<CatalogCache<MarketDescription>>,
}

impl InvariantMarketCache {
    /// Create a cache without a background refresh. Cultures are loaded on first request.
    pub fn new(fetcher: Arc<dyn MarketDescriptionFetcher>) -> InvariantMarketCache {
        InvariantMarketCache {
            catalog: Arc::new(CatalogCache::new(fetcher, Vec::new())),
        }
    }

    /// Create a cache that loads `config.cultures` right away and refreshes every
    /// `config.refresh_interval`.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn start(
        fetcher: Arc<dyn MarketDescriptionFetcher>,
        config: &MarketCacheConfig,
    ) -> InvariantMarketCache {
        InvariantMarketCache {
            catalog: CatalogCache::start(fetcher, config),
        }
    }

    /// Description of `market_id` with names in all `cultures`.
    ///
    /// Cultures not loaded yet are fetched as full lists. Returns `None` if the market is missing
    /// from any culture. A miss does not trigger a reload.
    pub async fn get_market_description<S: AsRef<str> + Sync>(
        &self,
        market_id: i64,
        cultures: &[S],
    ) -> Result<Option<MarketDescription>, CacheError> {
        self.catalog.get(&market_id, cultures).await
    }

    /// Refetch every tracked culture, e.g. after a caller found `market_id` unexpectedly missing.
    ///
    /// Returns whether the refetch succeeded.
    pub async fn reload_market_description(&self, market_id: i64, specifiers: &Specifiers) -> bool {
        log::debug!(target: "oddsfeed", market_id; "reloading invariant markets");
        match self.catalog.reload().await {
            Ok(()) => true,
            Err(err) => {
                log::warn!(target: "oddsfeed",
                           market_id,
                           specifiers:serde = specifiers;
                           "failed to reload invariant markets: {err}");
                false
            }
        }
    }

    pub fn loaded_cultures(&self) -> Vec<String> {
        self.catalog.loaded_cultures()
    }

    pub fn last_fetched(&self, culture: &str) -> Option<DateTime<Utc>> {
        self.catalog.last_fetched(culture)
    }

    /// Stop the background refresh and wait for it to exit.
    pub async fn shutdown(&self) -> Result<(), CacheError> {
        self.catalog.shutdown().await
    }
}
