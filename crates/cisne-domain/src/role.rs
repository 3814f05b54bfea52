//! Account role.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role carried by every account and every session token.
///
/// Wire format: upper-case string (`"ADMIN"`, `"CENTRE"`, `"THERAPIST"`, `"PATIENT"`).
/// Every non-admin role owns exactly one profile row keyed by the user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Centre,
    Therapist,
    Patient,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Centre, Role::Therapist, Role::Patient];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Centre => "CENTRE",
            Self::Therapist => "THERAPIST",
            Self::Patient => "PATIENT",
        }
    }

    /// Roles a client may pick for itself at registration.
    pub fn is_self_registrable(self) -> bool {
        !matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "CENTRE" => Ok(Self::Centre),
            "THERAPIST" => Ok(Self::Therapist),
            "PATIENT" => Ok(Self::Patient),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}
