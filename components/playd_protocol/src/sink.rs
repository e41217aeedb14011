use std::fmt;

use crate::response::Response;

/// Identifies an attached client; [`ClientId::BROADCAST`] addresses all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(usize);

impl ClientId {
    pub const BROADCAST: Self = Self(0);

    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivers responses to clients.
///
/// Delivery is fire-and-forget: a response to a client that has gone away is
/// dropped, and a failure to reach one client never affects the others.
pub trait ResponseSink: Send + Sync {
    fn respond(&self, response: &Response, id: ClientId);
}
