//! Interface of the REST provider that serves market descriptions.
//!
//! The transport (HTTP calls, response decoding, retries) lives outside of this crate. Caches only
//! need the three list/item endpoints below and the transfer objects they return.
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Failure of a call to the REST provider.
#[derive(thiserror::Error, Debug, Clone)]
pub enum FetchError {
    /// Request could not be completed.
    #[error("communication error: {0}")]
    // Transport errors are rarely clonable, so they are wrapped in an Arc.
    Communication(Arc<dyn std::error::Error + Send + Sync>),

    /// Response was received but could not be decoded.
    #[error("failed to deserialize response: {0}")]
    Deserialization(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        FetchError::Deserialization(value.to_string())
    }
}

/// REST provider of market descriptions. All methods return data for a single culture.
#[async_trait]
pub trait MarketDescriptionFetcher: Send + Sync {
    /// Full list of invariant market descriptions.
    async fn fetch_invariant_market_descriptions(
        &self,
        culture: &str,
    ) -> Result<Vec<MarketDescriptionDto>, FetchError>;

    /// Full list of shared variant descriptions.
    async fn fetch_variant_descriptions(
        &self,
        culture: &str,
    ) -> Result<Vec<VariantDescriptionDto>, FetchError>;

    /// Description of one market for one specific variant value.
    async fn fetch_single_variant_market_description(
        &self,
        market_id: i64,
        culture: &str,
        variant: &str,
    ) -> Result<MarketDescriptionDto, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketDescriptionDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub outcome_type: Option<String>,
    #[serde(default)]
    pub specifiers: Option<Vec<SpecifierDto>>,
    #[serde(default)]
    pub outcomes: Option<Vec<OutcomeDto>>,
    #[serde(default)]
    pub mappings: Option<Vec<MappingDto>>,
    #[serde(default)]
    pub attributes: Option<Vec<AttributeDto>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecifierDto {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDto {
    #[serde(default)]
    pub product_ids: Vec<u32>,
    #[serde(default)]
    pub sport_id: Option<String>,
    pub market_id: String,
    #[serde(default)]
    pub sov_template: Option<String>,
    #[serde(default)]
    pub valid_for: Option<String>,
    #[serde(default)]
    pub outcome_mappings: Vec<OutcomeMappingDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeMappingDto {
    pub outcome_id: String,
    pub product_outcome_id: String,
    #[serde(default)]
    pub product_outcome_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDto {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDescriptionDto {
    pub id: String,
    #[serde(default)]
    pub outcomes: Vec<OutcomeDto>,
}
