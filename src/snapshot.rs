use crate::time::UnixTime;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Newtype wrapper for member identifiers (SteamID64 upstream).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SteamId(pub u64);

impl From<u64> for SteamId {
    fn from(id: u64) -> Self {
        SteamId(id)
    }
}

impl From<SteamId> for u64 {
    fn from(id: SteamId) -> u64 {
        id.0
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entity's raw state as listed by the external source.
///
/// Field values mirror the upstream team listing verbatim; the engine
/// never edits them, it only compares and stores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub steam_id: SteamId,
    pub name: String,
    /// World coordinates
    pub x: f32,
    pub y: f32,
    pub is_online: bool,
    pub is_alive: bool,
    /// Unix seconds, 0 = never spawned
    pub spawn_time: UnixTime,
    /// Unix seconds, 0 = never died
    pub death_time: UnixTime,
}

/// Rejection reasons for a malformed snapshot.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    /// The member list carries the same identifier twice.
    #[error("duplicate member {0} in snapshot")]
    DuplicateMember(SteamId),
}

/// A full point-in-time listing of the team, as delivered by the external
/// source once per polling cycle.
///
/// Member order is preserved; it drives the order of join and transition
/// events on ingest. Construction validates the roster invariant that no
/// identifier appears twice, so `Roster::ingest` itself stays total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSnapshot {
    leader_id: SteamId,
    members: Vec<MemberRecord>,
}

impl TeamSnapshot {
    pub fn new(leader_id: SteamId, members: Vec<MemberRecord>) -> Result<Self, SnapshotError> {
        let mut seen = AHashSet::with_capacity(members.len());
        for record in &members {
            if !seen.insert(record.steam_id) {
                return Err(SnapshotError::DuplicateMember(record.steam_id));
            }
        }
        Ok(Self { leader_id, members })
    }

    pub fn leader_id(&self) -> SteamId {
        self.leader_id
    }

    pub fn members(&self) -> &[MemberRecord] {
        &self.members
    }

    /// Whether the listing names the given identifier
    pub fn contains(&self, id: SteamId) -> bool {
        self.members.iter().any(|m| m.steam_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64) -> MemberRecord {
        MemberRecord {
            steam_id: SteamId(id),
            name: format!("player-{id}"),
            x: 0.0,
            y: 0.0,
            is_online: true,
            is_alive: true,
            spawn_time: UnixTime::UNSET,
            death_time: UnixTime::UNSET,
        }
    }

    #[test]
    fn accepts_distinct_members() {
        let snap = TeamSnapshot::new(SteamId(1), vec![record(1), record(2)]).unwrap();
        assert_eq!(snap.members().len(), 2);
        assert!(snap.contains(SteamId(2)));
        assert!(!snap.contains(SteamId(3)));
    }

    #[test]
    fn rejects_duplicate_member() {
        let err = TeamSnapshot::new(SteamId(1), vec![record(1), record(2), record(1)]).unwrap_err();
        assert_eq!(err, SnapshotError::DuplicateMember(SteamId(1)));
    }

    #[test]
    fn empty_listing_is_valid() {
        let snap = TeamSnapshot::new(SteamId(7), Vec::new()).unwrap();
        assert!(snap.members().is_empty());
        assert_eq!(snap.leader_id(), SteamId(7));
    }
}
