//! Market description caches.
//!
//! Descriptions come from three sources that [`MarketCacheProvider`] composes into one lookup:
//!
//! - [`InvariantMarketCache`] holds the full market catalog, one list per culture.
//! - [`VariantDescriptionListCache`] holds shared outcome sets of variant markets (e.g. correct
//!   score markets), one list per culture.
//! - [`SingleVariantMarketCache`] holds descriptions whose outcomes are specific to a single
//!   `(market id, variant)` pair and are fetched one by one on demand.
//!
//! The two list caches are refreshed wholesale by a background task and load missing cultures on
//! demand. Single-variant items are fetched once and kept for the lifetime of the cache.
mod catalog;
#[cfg(test)]
pub(crate) mod fake;
mod invariant;
mod provider;
mod refresher;
mod single_variant;
mod variant_list;

pub use invariant::InvariantMarketCache;
pub use provider::{MarketCacheProvider, MarketDescriptionProvider};
pub use single_variant::SingleVariantMarketCache;
pub use variant_list::VariantDescriptionListCache;

use crate::{fetcher::FetchError, mapping::ValidatorBuildError};

/// Market description caches could not produce a description.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum CacheError {
    /// Call to the REST provider failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The provider returned a description that cannot be used. Such descriptions are never
    /// cached.
    #[error("invalid description of market {market_id} (variant: {variant:?}): {reason}")]
    InvalidDescription {
        market_id: i64,
        variant: Option<String>,
        reason: &'static str,
    },

    /// A mapping of the description has a malformed validator expression.
    #[error(transparent)]
    ValidatorBuild(#[from] ValidatorBuildError),

    #[error("refresh task panicked")]
    RefreshTaskPanicked,
}
