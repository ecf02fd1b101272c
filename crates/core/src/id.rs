//! Stable identifiers for waveplan entities.

use serde::{Deserialize, Serialize};

/// Unique identifier for a ticket.
///
/// Ticket ids are stable strings owned by the ticket source (e.g.
/// `"TICKET-042"`); the engine never generates them. The ordering and
/// hashing impls make id-keyed sets and maps deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Create a ticket id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TicketId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TicketId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::str::FromStr for TicketId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}
