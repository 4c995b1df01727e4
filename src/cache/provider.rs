use std::sync::Arc;

use async_trait::async_trait;

use super::{
    CacheError, InvariantMarketCache, SingleVariantMarketCache, VariantDescriptionListCache,
};
use crate::{
    config::MarketCacheConfig,
    fetcher::MarketDescriptionFetcher,
    mapping::{MappingValidatorFactory, ValidatorBuildError},
    market::{Mapping, MarketDescription, VariantGrouping},
    specifiers::{Specifiers, VARIANT_SPECIFIER},
};

/// Source of market descriptions resolved for one market occurrence.
#[async_trait]
pub trait MarketDescriptionProvider: Send + Sync {
    /// Description of `market_id` in `cultures`, with outcomes of the variant named by
    /// `specifiers` and the mapping that applies to `specifiers`.
    ///
    /// When `fetch_variant_descriptions` is false, outcomes that would require a single-variant
    /// fetch are left out (`outcomes() == None`). Returns `None` if the market is unknown.
    async fn get_market_description(
        &self,
        market_id: i64,
        specifiers: &Specifiers,
        cultures: &[String],
        fetch_variant_descriptions: bool,
    ) -> Result<Option<MarketDescription>, CacheError>;

    /// Force a refetch of the market catalog. Returns whether it succeeded.
    async fn reload_market_description(&self, market_id: i64, specifiers: &Specifiers) -> bool;
}

/// Composes the invariant, variant list and single-variant caches into a single lookup.
pub struct MarketCacheProvider {
    invariant: InvariantMarketCache,
    variant_list: VariantDescriptionListCache,
    single_variant: SingleVariantMarketCache,
    validators: MappingValidatorFactory,
}

impl MarketCacheProvider {
    pub fn new(
        invariant: InvariantMarketCache,
        variant_list: VariantDescriptionListCache,
        single_variant: SingleVariantMarketCache,
    ) -> MarketCacheProvider {
        MarketCacheProvider {
            invariant,
            variant_list,
            single_variant,
            validators: MappingValidatorFactory::new(),
        }
    }

    /// Create all caches over `fetcher` and start refreshing the list caches in the background.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn start(
        fetcher: Arc<dyn MarketDescriptionFetcher>,
        config: &MarketCacheConfig,
    ) -> MarketCacheProvider {
        MarketCacheProvider::new(
            InvariantMarketCache::start(fetcher.clone(), config),
            VariantDescriptionListCache::start(fetcher.clone(), config),
            SingleVariantMarketCache::new(fetcher),
        )
    }

    pub fn invariant_cache(&self) -> &InvariantMarketCache {
        &self.invariant
    }

    pub fn variant_list_cache(&self) -> &VariantDescriptionListCache {
        &self.variant_list
    }

    pub fn single_variant_cache(&self) -> &SingleVariantMarketCache {
        &self.single_variant
    }

    /// Stop background refreshes and wait for them to exit.
    pub async fn shutdown(&self) -> Result<(), CacheError> {
        let invariant = self.invariant.shutdown().await;
        let variant_list = self.variant_list.shutdown().await;
        invariant.and(variant_list)
    }

    /// Replace the outcomes of `base` with the ones fetched for `(market id, variant)`.
    async fn graft_single_variant(
        &self,
        base: MarketDescription,
        variant: &str,
        cultures: &[String],
    ) -> Result<MarketDescription, CacheError> {
        let single = self
            .single_variant
            .get_market_description(base.id(), variant, cultures)
            .await?;
        let outcomes = single.outcomes().map(<[_]>::to_vec);
        Ok(base.with_variant_outcomes(variant, outcomes))
    }

    /// The first mapping of `description` whose validator accepts `specifiers`.
    ///
    /// Mappings without a validator always apply. A validator failing on `specifiers` only
    /// disqualifies its own mapping.
    fn select_mapping(
        &self,
        description: &MarketDescription,
        specifiers: &Specifiers,
    ) -> Result<Option<Mapping>, ValidatorBuildError> {
        for mapping in description.mappings().unwrap_or_default() {
            let Some(valid_for) = &mapping.valid_for else {
                return Ok(Some(mapping.clone()));
            };
            let validator = self.validators.build(valid_for)?;
            match validator.validate(specifiers) {
                Ok(true) => return Ok(Some(mapping.clone())),
                Ok(false) => {}
                Err(err) => {
                    log::warn!(target: "oddsfeed",
                               market_id = description.id(),
                               valid_for = valid_for.as_str();
                               "skipping mapping: {err}");
                }
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl MarketDescriptionProvider for MarketCacheProvider {
    async fn get_market_description(
        &self,
        market_id: i64,
        specifiers: &Specifiers,
        cultures: &[String],
        fetch_variant_descriptions: bool,
    ) -> Result<Option<MarketDescription>, CacheError> {
        let Some(base) = self
            .invariant
            .get_market_description(market_id, cultures)
            .await?
        else {
            log::debug!(target: "oddsfeed", market_id; "market description not found");
            return Ok(None);
        };

        let variant = specifiers.get(VARIANT_SPECIFIER).map(String::as_str);
        let grouping = variant.and_then(|variant| Some((variant, base.variant_grouping(variant)?)));

        let description = match grouping {
            None => base,
            Some((variant, VariantGrouping::VariantList)) => {
                match self
                    .variant_list
                    .get_variant_description(variant, cultures)
                    .await?
                {
                    Some(found) => {
                        base.with_variant_outcomes(variant, Some(found.outcomes().to_vec()))
                    }
                    None if fetch_variant_descriptions => {
                        self.graft_single_variant(base, variant, cultures).await?
                    }
                    None => base.with_variant_outcomes(variant, None),
                }
            }
            Some((variant, VariantGrouping::SingleVariant)) => {
                if fetch_variant_descriptions {
                    self.graft_single_variant(base, variant, cultures).await?
                } else {
                    base.with_variant_outcomes(variant, None)
                }
            }
        };

        let mapping = self.select_mapping(&description, specifiers)?;
        Ok(Some(description.with_active_mapping(mapping)))
    }

    async fn reload_market_description(&self, market_id: i64, specifiers: &Specifiers) -> bool {
        self.invariant
            .reload_market_description(market_id, specifiers)
            .await
    }
}
