/**
 * Team presence tracking engine
 *
 * Reconciles periodic full-state team snapshots from an external source
 * against the previously known roster: detects membership changes and
 * per-member transitions (online/offline, alive/dead, moved/idle) and
 * maintains the derived temporal state (idle, offline, alive and dead
 * durations) that a single snapshot cannot provide. Transports,
 * notification formatting and cosmetic attribute storage live outside
 * this crate and consume the emitted events.
 */

pub mod config;
pub mod constants;
pub mod events;
pub mod snapshot;
pub mod time;

pub mod team {
    pub mod member;
    pub mod roster;
    #[cfg(test)]
    pub mod tests;
}

// Re-export important types
pub use config::RosterConfig;
pub use events::{TeamDiff, TeamEvent};
pub use snapshot::{MemberRecord, SnapshotError, SteamId, TeamSnapshot};
pub use team::member::Member;
pub use team::roster::Roster;
pub use time::UnixTime;
