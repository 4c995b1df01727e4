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
    market::VariantDescription,
};

#[async_trait]
impl CatalogEntry for VariantDescription {
    type Key = String;

    const CATALOG: &'static str = "variant_descriptions";

    fn key(&self) -> String {
        self.id().to_owned()
    }

    fn merge(&mut self, other: VariantDescription) {
        VariantDescription::merge(self, other)
    }

    async fn fetch(
        fetcher: &dyn MarketDescriptionFetcher,
        culture: &str,
    ) -> Result<Vec<VariantDescription>, FetchError> {
        let variants = fetcher.fetch_variant_descriptions(culture).await?;
        Ok(variants
            .into_iter()
            .map(|dto| VariantDescription::from_dto(culture, dto))
            .collect())
    }
}

/// Outcome sets shared by variant markets, loaded per culture.
pub struct VariantDescriptionListCache {
    catalog: Arc<CatalogCache<VariantDescription>>,
}

impl VariantDescriptionListCache {
    /// Create a cache without a background refresh. Cultures are loaded on first request.
    pub fn new(fetcher: Arc<dyn MarketDescriptionFetcher>) -> VariantDescriptionListCache {
        VariantDescriptionListCache {
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
    ) -> VariantDescriptionListCache {
        VariantDescriptionListCache {
            catalog: CatalogCache::start(fetcher, config),
        }
    }

    /// Outcomes of `variant` with names in all `cultures`, or `None` if the variant is not listed
    /// in any of them.
    pub async fn get_variant_description<S: AsRef<str> + Sync>(
        &self,
        variant: &str,
        cultures: &[S],
    ) -> Result<Option<VariantDescription>, CacheError> {
        self.catalog.get(&variant.to_owned(), cultures).await
    }

    /// Refetch every tracked culture.
    pub async fn reload(&self) -> Result<(), CacheError> {
        self.catalog.reload().await
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
