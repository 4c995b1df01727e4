use std::{fmt, str::FromStr};

use rust_decimal::Decimal;

use crate::error::FormatError;

/// A `home:away` score. Components may be decimal (e.g. half goals in some flex markets).
///
/// Flex score markets name their outcomes relative to a base score carried in the `score`
/// specifier, so the displayed outcome name is `base + delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub home: Decimal,
    pub away: Decimal,
}

impl Score {
    pub fn new(home: impl Into<Decimal>, away: impl Into<Decimal>) -> Score {
        Score {
            home: home.into(),
            away: away.into(),
        }
    }

    /// Componentwise sum, or `None` if a component overflows.
    pub fn checked_add(self, rhs: Score) -> Option<Score> {
        Some(Score {
            home: self.home.checked_add(rhs.home)?,
            away: self.away.checked_add(rhs.away)?,
        })
    }
}

impl FromStr for Score {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Score, FormatError> {
        let invalid = || FormatError::InvalidScore(s.to_owned());

        let mut parts = s.split(':');
        let (Some(home), Some(away), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };

        let home = parse_component(home).ok_or_else(invalid)?;
        let away = parse_component(away).ok_or_else(invalid)?;

        Ok(Score { home, away })
    }
}

fn parse_component(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s).ok()
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.home, self.away)
    }
}
