//! Typed ID wrappers.
//!
//! Records are keyed by UUID; the newtype keeps vCenter identifiers from
//! being confused with arbitrary strings at call sites.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

/// Unique identifier for a registered vCenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VcenterId(Uuid);

impl VcenterId {
    /// Generate a new random vCenter ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VcenterId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for VcenterId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<VcenterId> for Uuid {
    fn from(id: VcenterId) -> Self {
        id.0
    }
}

impl FromStr for VcenterId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| Error::invalid_input(format!("invalid vcenter id '{s}': {e}")))
    }
}

impl std::fmt::Display for VcenterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
