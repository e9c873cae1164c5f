use crate::snapshot::SteamId;
use serde::{Deserialize, Serialize};

/// A named fact about a change detected between two consecutive snapshots.
///
/// Emitted by `Roster::ingest` in a fixed section order: leader change
/// first, then joins, then leaves, then per-member transitions. Joins and
/// transitions follow the snapshot's member order; leave order follows map
/// iteration and is not guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamEvent {
    /// The designated leader differs from the previous cycle.
    /// `old` is `None` on the first ingest.
    LeaderChanged {
        old: Option<SteamId>,
        new: SteamId,
    },
    /// Identifier appeared that was not in the roster. Collaborators
    /// allocate first-time cosmetic attributes on this event, exactly once
    /// per identifier.
    MemberJoined(SteamId),
    /// Identifier disappeared from the listing.
    MemberLeft(SteamId),
    WentOnline(SteamId),
    WentOffline(SteamId),
    BecameAlive(SteamId),
    /// Alive flag flipped to dead, or the death timestamp changed without
    /// an observed alive window (re-death within one polling interval).
    BecameDead(SteamId),
    /// The member sat stationary online past the idle threshold. Fires
    /// once per stationary stretch; movement or a reconnect re-arms it.
    BecameIdle(SteamId),
}

/// Everything one ingest cycle detected: the ordered event list plus the
/// recomputed aggregate flags.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeamDiff {
    pub events: Vec<TeamEvent>,
    pub all_online: bool,
    pub all_offline: bool,
}

impl TeamDiff {
    /// True when the cycle detected no changes at all
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
