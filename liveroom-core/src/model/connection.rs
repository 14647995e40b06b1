use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one live signaling connection.
///
/// Assigned by the server when the socket is accepted and never reused for
/// the lifetime of the process. Ordering is numeric; the smaller identifier
/// of a pair is the side that sends the offer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    /// Returns true when this side is responsible for offering to `remote`.
    pub fn initiates_with(&self, remote: &ConnectionId) -> bool {
        self < remote
    }
}

impl From<u64> for ConnectionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}
