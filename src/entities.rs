//! Interfaces of the entity caches that name generation reads from.
//!
//! Sport events, competitors and player profiles are cached elsewhere. Name expressions only need
//! to resolve a few localized names, and every such lookup is an explicit async call on one of the
//! traits below so that I/O stays visible at the call site.
use std::sync::Arc;

use async_trait::async_trait;

use crate::Urn;

/// Entity lookup failure reported by an entity cache.
#[derive(thiserror::Error, Debug, Clone)]
pub enum EntityError {
    #[error("entity {0} not found")]
    NotFound(Urn),

    /// Any other failure (transport, deserialization, ...) of the underlying cache.
    #[error(transparent)]
    Other(Arc<dyn std::error::Error + Send + Sync>),
}

/// The sport event a market belongs to.
#[async_trait]
pub trait SportEvent: Send + Sync {
    fn id(&self) -> &Urn;

    /// Whether the event is played between a home and an away competitor.
    fn is_match(&self) -> bool {
        self.id().kind() == Urn::MATCH
    }

    async fn home_competitor(&self) -> Result<Option<Urn>, EntityError>;

    async fn away_competitor(&self) -> Result<Option<Urn>, EntityError>;

    /// Localized name of the event itself. Used for events that are not matches (e.g. races).
    async fn name(&self, culture: &str) -> Result<Option<String>, EntityError>;
}

/// Localized names of players and competitors.
#[async_trait]
pub trait ProfileCache: Send + Sync {
    async fn get_player_name(&self, player: &Urn, culture: &str)
        -> Result<Option<String>, EntityError>;

    async fn get_competitor_name(
        &self,
        competitor: &Urn,
        culture: &str,
    ) -> Result<Option<String>, EntityError>;
}
