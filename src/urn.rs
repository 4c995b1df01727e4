use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FormatError;

/// Identifier of a feed entity in the `prefix:type:id` form, e.g. `sr:player:1234`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Urn {
    prefix: String,
    kind: String,
    id: i64,
}

impl Urn {
    /// Entity type of player profiles.
    pub const PLAYER: &'static str = "player";
    /// Entity type of competitor profiles.
    pub const COMPETITOR: &'static str = "competitor";
    /// Entity type of sport events played between two competitors.
    pub const MATCH: &'static str = "match";

    pub fn new(prefix: impl Into<String>, kind: impl Into<String>, id: i64) -> Urn {
        Urn {
            prefix: prefix.into(),
            kind: kind.into(),
            id,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Entity type, e.g. `player` or `match`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> i64 {
        self.id
    }
}

impl FromStr for Urn {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Urn, FormatError> {
        let invalid = || FormatError::InvalidUrn(s.to_owned());

        let mut parts = s.trim().splitn(3, ':');
        let (Some(prefix), Some(kind), Some(id)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        if prefix.is_empty() || kind.is_empty() {
            return Err(invalid());
        }
        let id = id.parse().map_err(|_| invalid())?;

        Ok(Urn::new(prefix, kind, id))
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.prefix, self.kind, self.id)
    }
}

impl Serialize for Urn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Urn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Urn, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl log::kv::ToValue for Urn {
    fn to_value(&self) -> log::kv::Value {
        log::kv::Value::from_display(self)
    }
}
