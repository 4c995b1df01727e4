//! Localized market and outcome names for a single market occurrence.
use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    cache::MarketDescriptionProvider,
    config::{ExceptionHandlingStrategy, MarketCacheConfig},
    entities::{ProfileCache, SportEvent},
    expression::{parse_descriptor, parse_expression, resolve_profile_names, NameExpressionFactory},
    market::{MarketDescription, Outcome},
    specifiers::{Specifiers, SCORE_SPECIFIER},
    Error, FormatError, Result, Score, Urn,
};

/// Generates names of one market of one sport event.
#[async_trait]
pub trait MarketNameProvider: Send + Sync {
    /// Name of the market in `culture`.
    ///
    /// Returns `Ok(None)` if the name could not be generated and the exception handling strategy
    /// is [`ExceptionHandlingStrategy::Catch`].
    async fn get_market_name(&self, culture: &str) -> Result<Option<String>>;

    /// Name of the outcome `outcome_id` in `culture`.
    ///
    /// Returns `Ok(None)` if the name could not be generated and the exception handling strategy
    /// is [`ExceptionHandlingStrategy::Catch`].
    async fn get_outcome_name(&self, outcome_id: &str, culture: &str) -> Result<Option<String>>;
}

/// Builds [`NameProvider`]s sharing the same caches.
#[derive(Clone)]
pub struct NameProviderFactory {
    descriptions: Arc<dyn MarketDescriptionProvider>,
    profile_cache: Arc<dyn ProfileCache>,
    expressions: NameExpressionFactory,
    strategy: ExceptionHandlingStrategy,
}

impl NameProviderFactory {
    pub fn new(
        descriptions: Arc<dyn MarketDescriptionProvider>,
        profile_cache: Arc<dyn ProfileCache>,
        strategy: ExceptionHandlingStrategy,
    ) -> NameProviderFactory {
        NameProviderFactory {
            descriptions,
            expressions: NameExpressionFactory::new(profile_cache.clone()),
            profile_cache,
            strategy,
        }
    }

    /// Factory using the exception handling strategy of `config`.
    pub fn from_config(
        descriptions: Arc<dyn MarketDescriptionProvider>,
        profile_cache: Arc<dyn ProfileCache>,
        config: &MarketCacheConfig,
    ) -> NameProviderFactory {
        NameProviderFactory::new(
            descriptions,
            profile_cache,
            config.exception_handling_strategy,
        )
    }

    /// Bind to the market `market_id` of `sport_event` with `specifiers`.
    pub fn build_name_provider(
        &self,
        sport_event: Arc<dyn SportEvent>,
        market_id: i64,
        specifiers: Specifiers,
    ) -> NameProvider {
        NameProvider {
            sport_event,
            market_id,
            specifiers: Arc::new(specifiers),
            descriptions: self.descriptions.clone(),
            profile_cache: self.profile_cache.clone(),
            expressions: self.expressions.clone(),
            strategy: self.strategy,
        }
    }
}

/// Names of one market occurrence.
pub struct NameProvider {
    sport_event: Arc<dyn SportEvent>,
    market_id: i64,
    specifiers: Arc<Specifiers>,
    descriptions: Arc<dyn MarketDescriptionProvider>,
    profile_cache: Arc<dyn ProfileCache>,
    expressions: NameExpressionFactory,
    strategy: ExceptionHandlingStrategy,
}

impl NameProvider {
    pub fn market_id(&self) -> i64 {
        self.market_id
    }

    pub fn specifiers(&self) -> &Specifiers {
        &self.specifiers
    }

    async fn market_name(&self, culture: &str) -> Result<String> {
        // The market name never depends on single-variant outcomes.
        let description = self.description(culture, false).await?;
        let template = description.name(culture).ok_or_else(|| Error::NameNotFound {
            market_id: self.market_id,
            culture: culture.to_owned(),
        })?;
        self.render(template, culture).await
    }

    async fn outcome_name(&self, outcome_id: &str, culture: &str) -> Result<String> {
        let description = self.description(culture, true).await?;

        let Some(outcome) = description.outcome(outcome_id) else {
            if is_profile_list(outcome_id) {
                return Ok(
                    resolve_profile_names(self.profile_cache.as_ref(), outcome_id, culture).await?,
                );
            }
            return Err(Error::OutcomeNotFound {
                market_id: self.market_id,
                outcome_id: outcome_id.to_owned(),
            });
        };

        let template = outcome.name(culture).ok_or_else(|| Error::NameNotFound {
            market_id: self.market_id,
            culture: culture.to_owned(),
        })?;

        if let Some(score) = self.flex_score(&description, outcome, template)? {
            return Ok(score.to_string());
        }
        self.render(template, culture).await
    }

    /// Score shown by an outcome of a flex score market: the base `score` specifier plus the
    /// delta encoded in the outcome.
    fn flex_score(
        &self,
        description: &MarketDescription,
        outcome: &Outcome,
        template: &str,
    ) -> Result<Option<Score>> {
        let Some(base) = self.specifiers.get(SCORE_SPECIFIER) else {
            return Ok(None);
        };

        let delta = match template.parse::<Score>() {
            Ok(delta) => delta,
            Err(_) if description.is_flex_score() => match outcome.id().parse::<Score>() {
                Ok(delta) => delta,
                Err(_) => return Ok(None),
            },
            Err(_) => return Ok(None),
        };

        let sum = base.parse::<Score>()?.checked_add(delta);
        sum.map(Some)
            .ok_or_else(|| FormatError::InvalidScore(base.clone()).into())
    }

    async fn description(
        &self,
        culture: &str,
        fetch_variant_descriptions: bool,
    ) -> Result<MarketDescription> {
        self.descriptions
            .get_market_description(
                self.market_id,
                &self.specifiers,
                &[culture.to_owned()],
                fetch_variant_descriptions,
            )
            .await?
            .ok_or(Error::MarketDescriptionNotFound {
                market_id: self.market_id,
            })
    }

    /// Evaluate every `{...}` expression of `template` and substitute the results.
    async fn render(&self, template: &str, culture: &str) -> Result<String> {
        let descriptor = parse_descriptor(template)?;

        let mut values = Vec::with_capacity(descriptor.expressions().len());
        for expression in descriptor.expressions() {
            let (operator, operand) = parse_expression(expression)?;
            let expression =
                self.expressions
                    .build(&self.sport_event, &self.specifiers, operator, operand)?;
            values.push(expression.build_name(culture).await?);
        }

        Ok(descriptor.render(&values))
    }

    fn handle<T>(&self, result: Result<T>, culture: &str) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => match self.strategy {
                ExceptionHandlingStrategy::Throw => Err(err),
                ExceptionHandlingStrategy::Catch => {
                    log::error!(target: "oddsfeed",
                                market_id = self.market_id,
                                event_id = self.sport_event.id(),
                                culture;
                                "failed to generate name: {err}");
                    Ok(None)
                }
            },
        }
    }
}

#[async_trait]
impl MarketNameProvider for NameProvider {
    async fn get_market_name(&self, culture: &str) -> Result<Option<String>> {
        let result = self.market_name(culture).await;
        self.handle(result, culture)
    }

    async fn get_outcome_name(&self, outcome_id: &str, culture: &str) -> Result<Option<String>> {
        let result = self.outcome_name(outcome_id, culture).await;
        self.handle(result, culture)
    }
}

/// Whether `outcome_id` is one or more comma-separated player/competitor ids.
fn is_profile_list(outcome_id: &str) -> bool {
    outcome_id.split(',').all(|id| {
        id.trim()
            .parse::<Urn>()
            .is_ok_and(|urn| matches!(urn.kind(), Urn::PLAYER | Urn::COMPETITOR))
    })
}
