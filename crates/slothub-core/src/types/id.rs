//! Typed identifiers.
//!
//! Slots are keyed by the database-assigned integer id. Lease tokens are
//! random UUIDs so that a caller cannot guess the token of another
//! caller's hold. When the `sqlx` feature is enabled, `SlotId` also
//! implements the sqlx encode/decode traits for PostgreSQL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a bookable time slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
#[serde(transparent)]
pub struct SlotId(pub i64);

impl SlotId {
    /// Return the raw integer value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SlotId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<i64> for SlotId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<SlotId> for i64 {
    fn from(id: SlotId) -> i64 {
        id.0
    }
}

/// Opaque value distinguishing one lease instance from every later lease
/// on the same slot.
///
/// A fresh token is minted on every reservation (and on every rollback
/// after a failed commit), so comparing tokens doubles as a generation
/// check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaseToken(Uuid);

impl LeaseToken {
    /// Mint a new random token.
    pub fn mint() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return a reference to the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for LeaseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LeaseToken {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<Uuid> for LeaseToken {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
