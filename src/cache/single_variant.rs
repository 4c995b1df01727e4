use std::sync::Arc;

use dashmap::DashMap;

use super::CacheError;
use crate::{
    fetcher::MarketDescriptionFetcher,
    market::MarketDescription,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VariantKey {
    market_id: i64,
    variant: String,
}

/// Descriptions of markets whose outcomes depend on a single variant value (e.g. player props),
/// fetched one `(market id, variant)` pair at a time.
///
/// Items are accreted culture by culture and kept for the lifetime of the cache. Concurrent
/// requests for the same pair wait on a per-pair gate so that each culture is fetched exactly once.
pub struct SingleVariantMarketCache {
    fetcher: Arc<dyn MarketDescriptionFetcher>,
    items: DashMap<VariantKey, MarketDescription>,
    gates: DashMap<VariantKey, Arc<tokio::sync::Mutex<()>>>,
}

impl SingleVariantMarketCache {
    pub fn new(fetcher: Arc<dyn MarketDescriptionFetcher>) -> SingleVariantMarketCache {
        SingleVariantMarketCache {
            fetcher,
            items: DashMap::new(),
            gates: DashMap::new(),
        }
    }

    /// Description of `market_id` for `variant` with names in all `cultures`.
    ///
    /// Missing cultures are fetched from the provider. A response that fails to deserialize or
    /// does not describe the requested market with a non-empty outcome list is logged and not
    /// cached, so a later request retries it.
    pub async fn get_market_description<S: AsRef<str> + Sync>(
        &self,
        market_id: i64,
        variant: &str,
        cultures: &[S],
    ) -> Result<MarketDescription, CacheError> {
        let key = VariantKey {
            market_id,
            variant: variant.to_owned(),
        };

        if let Some(description) = self.cached(&key, cultures) {
            return Ok(description);
        }

        let gate = self.gates.entry(key.clone()).or_default().clone();
        let result = {
            let _guard = gate.lock().await;
            self.load(&key, cultures).await
        };

        // Requests still waiting hold their own clone and keep the gate in place.
        drop(gate);
        self.gates.remove_if(&key, |_, gate| Arc::strong_count(gate) == 1);

        result
    }

    /// Number of cached `(market id, variant)` pairs.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn cached<S: AsRef<str>>(&self, key: &VariantKey, cultures: &[S]) -> Option<MarketDescription> {
        let item = self.items.get(key)?;
        (!cultures.is_empty() && item.has_cultures(cultures)).then(|| item.value().clone())
    }

    async fn load<S: AsRef<str> + Sync>(
        &self,
        key: &VariantKey,
        cultures: &[S],
    ) -> Result<MarketDescription, CacheError> {
        // Someone else may have fetched it while we were waiting.
        let mut description = self.items.get(key).map(|it| it.value().clone());
        let missing: Vec<&str> = cultures
            .iter()
            .map(AsRef::as_ref)
            .filter(|culture| {
                description
                    .as_ref()
                    .map_or(true, |it| !it.has_cultures(&[*culture]))
            })
            .collect();
        if missing.is_empty() {
            if let Some(description) = description {
                return Ok(description);
            }
        }

        let mut result = Ok(());
        for culture in missing {
            match self.fetch(key.market_id, &key.variant, culture).await {
                Ok(fetched) => match &mut description {
                    Some(description) => description.merge(fetched),
                    None => description = Some(fetched),
                },
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }

        // Cultures fetched before a failure are valid and kept.
        if let Some(description) = &description {
            self.items.insert(key.clone(), description.clone());
        }
        result?;

        description.ok_or_else(|| CacheError::InvalidDescription {
            market_id: key.market_id,
            variant: Some(key.variant.clone()),
            reason: "no cultures requested",
        })
    }

    async fn fetch(
        &self,
        market_id: i64,
        variant: &str,
        culture: &str,
    ) -> Result<MarketDescription, CacheError> {
        log::debug!(target: "oddsfeed", market_id, variant, culture; "fetching single variant market");

        let dto = self
            .fetcher
            .fetch_single_variant_market_description(market_id, culture, variant)
            .await
            .map_err(|err| {
                log::error!(target: "oddsfeed",
                            market_id,
                            variant,
                            culture;
                            "failed to fetch single variant market: {err}");
                CacheError::from(err)
            })?;

        let reason = if dto.id != market_id {
            Some("unexpected market id")
        } else if dto.outcomes.as_ref().map_or(true, Vec::is_empty) {
            Some("missing outcomes")
        } else {
            None
        };
        if let Some(reason) = reason {
            log::error!(target: "oddsfeed",
                        market_id,
                        variant,
                        culture;
                        "invalid single variant market description: {reason}");
            return Err(CacheError::InvalidDescription {
                market_id,
                variant: Some(variant.to_owned()),
                reason,
            });
        }

        Ok(MarketDescription::from_dto(culture, dto))
    }
}
