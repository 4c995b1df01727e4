//! In-memory REST provider for cache tests.
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::fetcher::{
    FetchError, MappingDto, MarketDescriptionDto, MarketDescriptionFetcher, OutcomeDto,
    SpecifierDto, VariantDescriptionDto,
};

#[derive(Default)]
pub(crate) struct FakeFetcher {
    pub invariant: Mutex<HashMap<String, Vec<MarketDescriptionDto>>>,
    pub variants: Mutex<HashMap<String, Vec<VariantDescriptionDto>>>,
    /// Keyed by `(market id, culture, variant)`.
    pub single_variant: Mutex<HashMap<(i64, String, String), MarketDescriptionDto>>,
    /// Delay of every single-variant response.
    pub delay: Option<Duration>,
    pub invariant_calls: AtomicUsize,
    pub variant_calls: AtomicUsize,
    pub single_variant_calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn with_invariant(self, culture: &str, markets: Vec<MarketDescriptionDto>) -> Self {
        self.invariant
            .lock()
            .unwrap()
            .insert(culture.to_owned(), markets);
        self
    }

    pub fn with_variants(self, culture: &str, variants: Vec<VariantDescriptionDto>) -> Self {
        self.variants
            .lock()
            .unwrap()
            .insert(culture.to_owned(), variants);
        self
    }

    pub fn with_single_variant(
        self,
        culture: &str,
        variant: &str,
        market: MarketDescriptionDto,
    ) -> Self {
        self.single_variant
            .lock()
            .unwrap()
            .insert((market.id, culture.to_owned(), variant.to_owned()), market);
        self
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn not_found(what: String) -> FetchError {
    FetchError::Communication(std::sync::Arc::new(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        what,
    )))
}

#[async_trait]
impl MarketDescriptionFetcher for FakeFetcher {
    async fn fetch_invariant_market_descriptions(
        &self,
        culture: &str,
    ) -> Result<Vec<MarketDescriptionDto>, FetchError> {
        self.invariant_calls.fetch_add(1, Ordering::SeqCst);
        let markets = self.invariant.lock().unwrap().get(culture).cloned();
        markets.ok_or_else(|| not_found(format!("no markets in {culture}")))
    }

    async fn fetch_variant_descriptions(
        &self,
        culture: &str,
    ) -> Result<Vec<VariantDescriptionDto>, FetchError> {
        self.variant_calls.fetch_add(1, Ordering::SeqCst);
        let variants = self.variants.lock().unwrap().get(culture).cloned();
        variants.ok_or_else(|| not_found(format!("no variants in {culture}")))
    }

    async fn fetch_single_variant_market_description(
        &self,
        market_id: i64,
        culture: &str,
        variant: &str,
    ) -> Result<MarketDescriptionDto, FetchError> {
        self.single_variant_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let market = self
            .single_variant
            .lock()
            .unwrap()
            .get(&(market_id, culture.to_owned(), variant.to_owned()))
            .cloned();
        market.ok_or_else(|| FetchError::Deserialization(format!("empty response for {variant}")))
    }
}

pub(crate) fn outcome(id: &str, name: &str) -> OutcomeDto {
    OutcomeDto {
        id: id.to_owned(),
        name: name.to_owned(),
        description: None,
    }
}

pub(crate) fn specifier(name: &str, kind: &str) -> SpecifierDto {
    SpecifierDto {
        name: name.to_owned(),
        kind: kind.to_owned(),
        description: None,
    }
}

pub(crate) fn mapping(market_id: &str, valid_for: Option<&str>) -> MappingDto {
    MappingDto {
        product_ids: vec![1, 3],
        sport_id: Some("sr:sport:1".to_owned()),
        market_id: market_id.to_owned(),
        sov_template: None,
        valid_for: valid_for.map(str::to_owned),
        outcome_mappings: Vec::new(),
    }
}

pub(crate) fn market(id: i64, name: &str) -> MarketDescriptionDto {
    MarketDescriptionDto {
        id,
        name: name.to_owned(),
        groups: vec!["all".to_owned()],
        outcome_type: None,
        specifiers: None,
        outcomes: None,
        mappings: None,
        attributes: None,
    }
}

pub(crate) fn variant(id: &str, outcomes: Vec<OutcomeDto>) -> VariantDescriptionDto {
    VariantDescriptionDto {
        id: id.to_owned(),
        outcomes,
    }
}
