use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    entities::{ProfileCache, SportEvent},
    specifiers::Specifiers,
    Urn,
};

use super::{NameExpressionError, Operand};

/// Entity referenced by a `{$...}` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityTarget {
    /// `{$event}`
    Event,
    /// `{$competitor1}`, the home competitor.
    Competitor1,
    /// `{$competitor2}`, the away competitor.
    Competitor2,
}

impl EntityTarget {
    fn parse(operand: &str) -> Option<EntityTarget> {
        match operand {
            "event" => Some(EntityTarget::Event),
            "competitor1" => Some(EntityTarget::Competitor1),
            "competitor2" => Some(EntityTarget::Competitor2),
            _ => None,
        }
    }
}

/// One evaluable `{...}` expression of a name template.
pub enum NameExpression {
    /// Raw operand value.
    Cardinal(Operand),
    /// Integer operand with an English ordinal suffix.
    Ordinal(Operand),
    /// Decimal operand with an explicit sign.
    Plus(Operand),
    /// Negated decimal operand with an explicit sign.
    Minus(Operand),
    /// Name of the sport event or one of its competitors.
    Entity {
        target: EntityTarget,
        sport_event: Arc<dyn SportEvent>,
        profile_cache: Arc<dyn ProfileCache>,
    },
    /// Names of the players/competitors whose ids are the operand value.
    PlayerProfile {
        operand: Operand,
        profile_cache: Arc<dyn ProfileCache>,
    },
}

impl NameExpression {
    /// Evaluate the expression for a single `culture`.
    pub async fn build_name(&self, culture: &str) -> Result<String, NameExpressionError> {
        match self {
            NameExpression::Cardinal(operand) => match operand {
                Operand::Simple(operand) => operand.get_string(),
                Operand::Expression(operand) => Ok(operand.get_decimal()?.normalize().to_string()),
            },
            NameExpression::Ordinal(operand) => Ok(ordinal(operand.get_int()?)),
            NameExpression::Plus(operand) => Ok(format_signed(operand.get_decimal()?)),
            NameExpression::Minus(operand) => Ok(format_signed(-operand.get_decimal()?)),
            NameExpression::Entity {
                target,
                sport_event,
                profile_cache,
            } => entity_name(*target, sport_event.as_ref(), profile_cache.as_ref(), culture).await,
            NameExpression::PlayerProfile {
                operand,
                profile_cache,
            } => resolve_profile_names(profile_cache.as_ref(), &operand.get_string()?, culture).await,
        }
    }
}

/// Builds [`NameExpression`]s for one market occurrence.
#[derive(Clone)]
pub struct NameExpressionFactory {
    profile_cache: Arc<dyn ProfileCache>,
}

impl NameExpressionFactory {
    pub fn new(profile_cache: Arc<dyn ProfileCache>) -> NameExpressionFactory {
        NameExpressionFactory { profile_cache }
    }

    /// Map a parsed `operator`/`operand` pair to an expression.
    pub fn build(
        &self,
        sport_event: &Arc<dyn SportEvent>,
        specifiers: &Arc<Specifiers>,
        operator: Option<char>,
        operand: &str,
    ) -> Result<NameExpression, NameExpressionError> {
        let parse_operand = || Operand::parse(specifiers.clone(), operand);

        let expression = match operator {
            None => NameExpression::Cardinal(parse_operand()?),
            Some('!') => NameExpression::Ordinal(parse_operand()?),
            Some('+') => NameExpression::Plus(parse_operand()?),
            Some('-') => NameExpression::Minus(parse_operand()?),
            Some('$') => NameExpression::Entity {
                target: EntityTarget::parse(operand).ok_or_else(|| {
                    NameExpressionError::UnsupportedOperand {
                        operator: '$',
                        operand: operand.to_owned(),
                    }
                })?,
                sport_event: sport_event.clone(),
                profile_cache: self.profile_cache.clone(),
            },
            Some('%') => NameExpression::PlayerProfile {
                operand: parse_operand()?,
                profile_cache: self.profile_cache.clone(),
            },
            Some(other) => return Err(NameExpressionError::UnsupportedOperator(other)),
        };

        Ok(expression)
    }
}

fn ordinal(value: i64) -> String {
    let suffix = match value.unsigned_abs() % 100 {
        11..=13 => "th",
        n => match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };
    format!("{value}{suffix}")
}

/// Zero (including negative zero) renders as `0`, everything else with an explicit sign.
fn format_signed(value: Decimal) -> String {
    if value.is_zero() {
        "0".to_owned()
    } else if value.is_sign_positive() {
        format!("+{}", value.normalize())
    } else {
        value.normalize().to_string()
    }
}

async fn entity_name(
    target: EntityTarget,
    sport_event: &dyn SportEvent,
    profile_cache: &dyn ProfileCache,
    culture: &str,
) -> Result<String, NameExpressionError> {
    match target {
        EntityTarget::Competitor1 => {
            competitor_name(sport_event.home_competitor().await?, profile_cache, culture).await
        }
        EntityTarget::Competitor2 => {
            competitor_name(sport_event.away_competitor().await?, profile_cache, culture).await
        }
        EntityTarget::Event if sport_event.is_match() => {
            let home =
                competitor_name(sport_event.home_competitor().await?, profile_cache, culture)
                    .await?;
            let away =
                competitor_name(sport_event.away_competitor().await?, profile_cache, culture)
                    .await?;
            Ok(format!("{home} vs {away}"))
        }
        EntityTarget::Event => {
            sport_event
                .name(culture)
                .await?
                .ok_or_else(|| NameExpressionError::NameNotFound {
                    entity: sport_event.id().to_string(),
                    culture: culture.to_owned(),
                })
        }
    }
}

async fn competitor_name(
    competitor: Option<Urn>,
    profile_cache: &dyn ProfileCache,
    culture: &str,
) -> Result<String, NameExpressionError> {
    let Some(competitor) = competitor else {
        return Err(NameExpressionError::NameNotFound {
            entity: "competitor".to_owned(),
            culture: culture.to_owned(),
        });
    };
    profile_name(profile_cache, &competitor, culture).await
}

/// Resolve a comma-separated list of player/competitor ids into their names, joined with commas
/// in input order.
pub(crate) async fn resolve_profile_names(
    profile_cache: &dyn ProfileCache,
    ids: &str,
    culture: &str,
) -> Result<String, NameExpressionError> {
    let mut names = Vec::new();
    for id in ids.split(',') {
        let urn: Urn = id
            .trim()
            .parse()
            .map_err(|_| NameExpressionError::InvalidUrn(id.to_owned()))?;
        names.push(profile_name(profile_cache, &urn, culture).await?);
    }
    Ok(names.join(","))
}

async fn profile_name(
    profile_cache: &dyn ProfileCache,
    urn: &Urn,
    culture: &str,
) -> Result<String, NameExpressionError> {
    let name = match urn.kind() {
        Urn::PLAYER => profile_cache.get_player_name(urn, culture).await?,
        Urn::COMPETITOR | "simpleteam" => profile_cache.get_competitor_name(urn, culture).await?,
        _ => return Err(NameExpressionError::UnsupportedUrnType(urn.clone())),
    };
    name.ok_or_else(|| NameExpressionError::NameNotFound {
        entity: urn.to_string(),
        culture: culture.to_owned(),
    })
}
