//! Numeric entity identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Surrogate key of any row in the system (users, profiles, catalog rows).
///
/// Profiles share the identifier of the user that owns them, so a centre,
/// therapist or patient id is always a user id as well.
///
/// Clients are inconsistent about sending ids as JSON numbers or as strings
/// (`5` vs `"5"`), and path segments are always text. Deserialization accepts
/// both so that ownership comparisons always happen on the numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(i32);

impl EntityId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

/// Errors returned when a textual or oversized id cannot be coerced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("id is not a number")]
    NotNumeric,
    #[error("id out of range")]
    OutOfRange,
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntityId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s.trim().parse().map_err(|_| IdError::NotNumeric)?;
        Self::try_from(value)
    }
}

impl TryFrom<i64> for EntityId {
    type Error = IdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        i32::try_from(value)
            .map(Self)
            .map_err(|_| IdError::OutOfRange)
    }
}

impl From<i32> for EntityId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<EntityId> for i32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self::try_from(n).map_err(serde::de::Error::custom),
            RawId::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
