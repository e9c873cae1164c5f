use crate::config::RosterConfig;
use crate::events::{TeamDiff, TeamEvent};
use crate::snapshot::{SteamId, TeamSnapshot};
use crate::team::member::Member;
use crate::time::UnixTime;
use ahash::{AHashMap, AHashSet};
use std::time::Duration;

/// The reconciled, stateful collection of currently tracked members for one
/// team. Owns every [`Member`] and is the only mutation path into them.
///
/// Single-writer: the driver must keep at most one `ingest` call in flight
/// per roster. Distinct rosters share no state and may be processed
/// concurrently.
#[derive(Debug, Clone)]
pub struct Roster {
    members: AHashMap<SteamId, Member>,
    leader_id: Option<SteamId>,
    all_online: bool,
    all_offline: bool,
    config: RosterConfig,
}

impl Roster {
    pub fn new(config: RosterConfig) -> Self {
        Self {
            members: AHashMap::new(),
            leader_id: None,
            all_online: false,
            all_offline: false,
            config,
        }
    }

    /// Reconcile a snapshot against the current membership, reading the
    /// wall clock once for the whole cycle.
    pub fn ingest(&mut self, snapshot: &TeamSnapshot) -> TeamDiff {
        self.ingest_at(snapshot, UnixTime::now())
    }

    /// Reconcile against an explicit clock reading. Snapshot replay and
    /// tests use this directly; `ingest` is the wall-clock wrapper.
    pub fn ingest_at(&mut self, snapshot: &TeamSnapshot, now: UnixTime) -> TeamDiff {
        let mut events = Vec::new();

        // Leader designation is compared against the previous cycle up
        // front; the event leads everything else in the emitted order.
        let new_leader = snapshot.leader_id();
        if self.leader_id != Some(new_leader) {
            log::info!("team leader changed to {}", new_leader);
            events.push(TeamEvent::LeaderChanged {
                old: self.leader_id,
                new: new_leader,
            });
            self.leader_id = Some(new_leader);
        }

        // Partition identifiers into joined / left / remaining before any
        // insertion, so a member never sees transition checks against the
        // record that created it.
        let joined: AHashSet<SteamId> = snapshot
            .members()
            .iter()
            .map(|r| r.steam_id)
            .filter(|id| !self.members.contains_key(id))
            .collect();
        let left: Vec<SteamId> = self
            .members
            .keys()
            .filter(|id| !snapshot.contains(**id))
            .copied()
            .collect();

        // Joined members, in snapshot order. Derived state starts empty;
        // collaborators key first-time attribute allocation off this event.
        for record in snapshot.members() {
            if joined.contains(&record.steam_id) {
                log::info!("member {} ({}) joined the team", record.name, record.steam_id);
                self.members.insert(
                    record.steam_id,
                    Member::new(record, self.config.idle_threshold),
                );
                events.push(TeamEvent::MemberJoined(record.steam_id));
            }
        }

        // Left members. Emission order follows map iteration and is not
        // guaranteed.
        for id in left {
            if let Some(member) = self.members.remove(&id) {
                log::info!("member {} ({}) left the team", member.name(), id);
                events.push(TeamEvent::MemberLeft(id));
            }
        }

        // Remaining members, in snapshot order: evaluate transitions
        // against the stored state, emit, then fold the record in.
        for record in snapshot.members() {
            if joined.contains(&record.steam_id) {
                continue;
            }
            let Some(member) = self.members.get_mut(&record.steam_id) else {
                continue;
            };
            let id = record.steam_id;

            if member.went_online(record) {
                log::debug!("member {} went online", id);
                events.push(TeamEvent::WentOnline(id));
            }
            if member.went_offline(record) {
                log::debug!("member {} went offline", id);
                events.push(TeamEvent::WentOffline(id));
            }
            if member.became_alive(record) {
                log::debug!("member {} spawned in", id);
                events.push(TeamEvent::BecameAlive(id));
            }
            if member.became_dead(record) {
                log::debug!("member {} died", id);
                events.push(TeamEvent::BecameDead(id));
            }
            // Idle needs both the stationary check against the incoming
            // record and the elapsed threshold; marking the member keeps
            // the event to once per online session.
            if member.became_idle(record) && member.idle_now(now) {
                log::debug!("member {} is idle", id);
                events.push(TeamEvent::BecameIdle(id));
                member.mark_idle();
            }

            member.update(record, now);
        }

        // Aggregates. Both flags stay false for an empty roster.
        self.all_online = !self.members.is_empty() && self.members.values().all(|m| m.is_online());
        self.all_offline =
            !self.members.is_empty() && self.members.values().all(|m| !m.is_online());

        TeamDiff {
            events,
            all_online: self.all_online,
            all_offline: self.all_offline,
        }
    }

    pub fn member(&self, id: SteamId) -> Option<&Member> {
        self.members.get(&id)
    }

    pub fn is_member(&self, id: SteamId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The designated leader, if any snapshot has been ingested
    pub fn leader_id(&self) -> Option<SteamId> {
        self.leader_id
    }

    /// The leader's member entry. `None` when no leader is designated or
    /// the designated leader is not currently in the roster.
    pub fn leader(&self) -> Option<&Member> {
        self.leader_id.and_then(|id| self.members.get(&id))
    }

    /// True when every tracked member is online; false for an empty roster
    pub fn all_online(&self) -> bool {
        self.all_online
    }

    /// True when every tracked member is offline; false for an empty roster
    pub fn all_offline(&self) -> bool {
        self.all_offline
    }

    pub fn online_count(&self) -> usize {
        self.members.values().filter(|m| m.is_online()).count()
    }

    /// The member with the greatest alive duration. `None` when the roster
    /// is empty; ties break toward the first encountered in iteration
    /// order.
    pub fn longest_alive(&self, now: UnixTime) -> Option<&Member> {
        let mut best: Option<(&Member, Duration)> = None;
        for member in self.members.values() {
            let alive = member.alive_duration(now);
            match best {
                Some((_, best_alive)) if alive <= best_alive => {}
                _ => best = Some((member, alive)),
            }
        }
        best.map(|(member, _)| member)
    }
}
