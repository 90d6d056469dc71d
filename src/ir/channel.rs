//! Channel identifiers and their allocator.

use serde::Serialize;

use crate::error::{Error, Result};

/// Opaque identifier of a channel between two stages.
///
/// Identifiers are ordered by issuance time within one compilation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChannelId(u64);

impl ChannelId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// One end of a fragment or stage.
///
/// `Unbound` marks wiring this pass leaves to a later one: an opaque tree
/// node placed in a fragment has no stdin or stdout of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Endpoint {
    Bound(ChannelId),
    Unbound,
}

impl Endpoint {
    pub fn channel(self) -> Option<ChannelId> {
        match self {
            Endpoint::Bound(id) => Some(id),
            Endpoint::Unbound => None,
        }
    }

    pub fn is_bound(self) -> bool {
        matches!(self, Endpoint::Bound(_))
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Bound(id) => id.fmt(f),
            Endpoint::Unbound => f.write_str("unbound"),
        }
    }
}

/// Monotonic source of channel identifiers for one compilation run.
///
/// Identifiers are never freed or reused.
#[derive(Debug, Clone, Default)]
pub struct ChannelAllocator {
    next: u64,
}

impl ChannelAllocator {
    /// An allocator whose first identifier is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Issue the next channel identifier.
    ///
    /// Fails once the counter cannot advance, so no identifier is ever reissued.
    pub fn next_channel(&mut self) -> Result<ChannelId> {
        let id = ChannelId(self.next);
        self.next = self
            .next
            .checked_add(1)
            .ok_or_else(|| Error::invariant("channel identifiers exhausted"))?;
        log::debug!("allocated channel {id}");
        Ok(id)
    }

    /// How many identifiers this allocator has handed out since `first`.
    pub fn issued_since(&self, first: u64) -> u64 {
        self.next - first
    }
}
