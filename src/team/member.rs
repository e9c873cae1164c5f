use crate::snapshot::{MemberRecord, SteamId};
use crate::time::UnixTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One tracked entity: raw state mirrored from the latest snapshot plus the
/// derived bookkeeping that only history can provide.
///
/// A member never outlives its roster entry. Leaving and rejoining the team
/// produces a fresh member with reset derived state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    steam_id: SteamId,
    name: String,
    x: f32,
    y: f32,
    is_online: bool,
    is_alive: bool,
    spawn_time: UnixTime,
    death_time: UnixTime,

    // Derived bookkeeping, absent from snapshots. Only `update` and
    // `mark_idle` touch these.
    last_movement_at: Option<UnixTime>,
    went_offline_at: Option<UnixTime>,
    was_idle: bool,
    idle_threshold: Duration,
}

impl Member {
    /// Seed a new member from its first snapshot record. Derived fields
    /// start empty; `last_movement_at` is stamped by the first update that
    /// sees movement or an online transition.
    pub(crate) fn new(record: &MemberRecord, idle_threshold: Duration) -> Self {
        Self {
            steam_id: record.steam_id,
            name: record.name.clone(),
            x: record.x,
            y: record.y,
            is_online: record.is_online,
            is_alive: record.is_alive,
            spawn_time: record.spawn_time,
            death_time: record.death_time,
            last_movement_at: None,
            went_offline_at: None,
            was_idle: false,
            idle_threshold,
        }
    }

    pub fn steam_id(&self) -> SteamId {
        self.steam_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// World coordinates from the latest snapshot
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn is_online(&self) -> bool {
        self.is_online
    }

    pub fn is_alive(&self) -> bool {
        self.is_alive
    }

    pub fn spawn_time(&self) -> UnixTime {
        self.spawn_time
    }

    pub fn death_time(&self) -> UnixTime {
        self.death_time
    }

    /// Last position change while online, or the moment the member most
    /// recently came online
    pub fn last_movement_at(&self) -> Option<UnixTime> {
        self.last_movement_at
    }

    /// Last observed online-to-offline transition
    pub fn went_offline_at(&self) -> Option<UnixTime> {
        self.went_offline_at
    }

    /// Whether idle has already been flagged for the current online session
    pub fn was_idle(&self) -> bool {
        self.was_idle
    }

    // Transition predicates. Each compares the stored state against an
    // incoming record without mutating; `update` is the only mutation path.

    pub fn identity_changed(&self, incoming: &MemberRecord) -> bool {
        self.steam_id != incoming.steam_id
    }

    pub fn name_changed(&self, incoming: &MemberRecord) -> bool {
        self.name != incoming.name
    }

    pub fn x_changed(&self, incoming: &MemberRecord) -> bool {
        self.x != incoming.x
    }

    pub fn y_changed(&self, incoming: &MemberRecord) -> bool {
        self.y != incoming.y
    }

    pub fn online_changed(&self, incoming: &MemberRecord) -> bool {
        self.is_online != incoming.is_online
    }

    pub fn spawn_time_changed(&self, incoming: &MemberRecord) -> bool {
        self.spawn_time != incoming.spawn_time
    }

    pub fn alive_changed(&self, incoming: &MemberRecord) -> bool {
        self.is_alive != incoming.is_alive
    }

    pub fn death_time_changed(&self, incoming: &MemberRecord) -> bool {
        self.death_time != incoming.death_time
    }

    /// Position differs on either axis
    pub fn moved(&self, incoming: &MemberRecord) -> bool {
        self.x_changed(incoming) || self.y_changed(incoming)
    }

    pub fn went_online(&self, incoming: &MemberRecord) -> bool {
        !self.is_online && incoming.is_online
    }

    pub fn went_offline(&self, incoming: &MemberRecord) -> bool {
        self.is_online && !incoming.is_online
    }

    pub fn became_alive(&self, incoming: &MemberRecord) -> bool {
        !self.is_alive && incoming.is_alive
    }

    /// A changed death timestamp counts as a new death even when the alive
    /// flag never visibly flipped (re-death within one polling interval).
    pub fn became_dead(&self, incoming: &MemberRecord) -> bool {
        (self.is_alive && !incoming.is_alive) || self.death_time_changed(incoming)
    }

    /// Idle is only flagged while already known online and the incoming
    /// position shows no movement. The roster combines this with
    /// [`idle_now`](Self::idle_now) and marks the member, so the event
    /// fires once per stationary stretch.
    pub fn became_idle(&self, incoming: &MemberRecord) -> bool {
        !self.was_idle && !self.moved(incoming) && self.is_online
    }

    /// Whether the member has sat still for at least the configured
    /// threshold. Always false until a movement or online transition has
    /// been observed.
    pub fn idle_now(&self, now: UnixTime) -> bool {
        match self.last_movement_at {
            Some(at) => now.saturating_since(at) >= self.idle_threshold,
            None => false,
        }
    }

    /// Record that idle has been flagged for the current online session
    pub(crate) fn mark_idle(&mut self) {
        self.was_idle = true;
    }

    /// Fold an incoming record into the stored state.
    ///
    /// Transition predicates must be evaluated before calling this; once it
    /// returns, the raw fields reflect `incoming` and the predicates all
    /// compare equal against it.
    pub fn update(&mut self, incoming: &MemberRecord, now: UnixTime) {
        if self.went_offline(incoming) {
            self.went_offline_at = Some(now);
        }

        if self.went_online(incoming) {
            self.last_movement_at = Some(now);
            self.was_idle = false;
        } else if self.moved(incoming) {
            self.last_movement_at = Some(now);
            self.was_idle = false;
        } else if !self.is_online {
            // Idle state is meaningless while offline. The source is
            // ambiguous on whether the flag should survive an offline
            // period; it is cleared here, see DESIGN.md.
            self.was_idle = false;
        }

        self.steam_id = incoming.steam_id;
        self.name = incoming.name.clone();
        self.x = incoming.x;
        self.y = incoming.y;
        self.is_online = incoming.is_online;
        self.is_alive = incoming.is_alive;
        self.spawn_time = incoming.spawn_time;
        self.death_time = incoming.death_time;
    }

    // Derived durations, computed on demand against the caller's clock
    // reading. All subtraction saturates at zero.

    /// Time since spawn; zero when the member has never spawned
    pub fn alive_duration(&self, now: UnixTime) -> Duration {
        if self.spawn_time.is_unset() {
            Duration::ZERO
        } else {
            now.saturating_since(self.spawn_time)
        }
    }

    /// Time since the last recorded death; zero when the member never died
    pub fn dead_duration(&self, now: UnixTime) -> Duration {
        if self.death_time.is_unset() {
            Duration::ZERO
        } else {
            now.saturating_since(self.death_time)
        }
    }

    /// Time since the member last went offline. `None` until the first
    /// observed online-to-offline transition.
    pub fn offline_duration(&self, now: UnixTime) -> Option<Duration> {
        self.went_offline_at.map(|at| now.saturating_since(at))
    }

    /// Time since the last movement or online transition; zero until
    /// either has been observed
    pub fn idle_duration(&self, now: UnixTime) -> Duration {
        match self.last_movement_at {
            Some(at) => now.saturating_since(at),
            None => Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: Duration = Duration::from_secs(60);

    fn record(online: bool, alive: bool, x: f32, y: f32) -> MemberRecord {
        MemberRecord {
            steam_id: SteamId(42),
            name: "alice".to_string(),
            x,
            y,
            is_online: online,
            is_alive: alive,
            spawn_time: UnixTime::from_secs(1000),
            death_time: UnixTime::UNSET,
        }
    }

    fn member(online: bool, alive: bool) -> Member {
        Member::new(&record(online, alive, 10.0, 20.0), THRESHOLD)
    }

    #[test]
    fn online_transitions() {
        let offline = member(false, true);
        let online = member(true, true);
        let incoming_online = record(true, true, 10.0, 20.0);
        let incoming_offline = record(false, true, 10.0, 20.0);

        assert!(offline.went_online(&incoming_online));
        assert!(!offline.went_offline(&incoming_online));
        assert!(online.went_offline(&incoming_offline));
        assert!(!online.went_online(&incoming_offline));
        assert!(!online.went_online(&incoming_online));
        assert!(!offline.went_offline(&incoming_offline));
    }

    #[test]
    fn moved_checks_both_axes() {
        let m = member(true, true);
        assert!(!m.moved(&record(true, true, 10.0, 20.0)));
        assert!(m.moved(&record(true, true, 11.0, 20.0)));
        assert!(m.moved(&record(true, true, 10.0, 19.0)));
    }

    #[test]
    fn death_time_change_counts_as_new_death() {
        let mut m = member(true, true);
        let mut incoming = record(true, true, 10.0, 20.0);
        incoming.death_time = UnixTime::from_secs(2000);

        // Alive flag never flips, only the timestamp moves.
        assert!(m.became_dead(&incoming));

        m.update(&incoming, UnixTime::from_secs(2001));
        assert!(!m.became_dead(&incoming));
    }

    #[test]
    fn flag_flip_counts_as_death_and_revival() {
        let alive = member(true, true);
        let dead_incoming = record(true, false, 10.0, 20.0);
        assert!(alive.became_dead(&dead_incoming));
        assert!(!alive.became_alive(&dead_incoming));

        let dead = member(true, false);
        let alive_incoming = record(true, true, 10.0, 20.0);
        assert!(dead.became_alive(&alive_incoming));
    }

    #[test]
    fn update_stamps_offline_time() {
        let mut m = member(true, true);
        let now = UnixTime::from_secs(5000);
        m.update(&record(false, true, 10.0, 20.0), now);

        assert!(!m.is_online());
        assert_eq!(m.went_offline_at(), Some(now));
        assert_eq!(
            m.offline_duration(now.plus_secs(30)),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn coming_online_restamps_movement_and_clears_idle() {
        let mut m = member(true, true);
        m.mark_idle();
        m.update(&record(false, true, 10.0, 20.0), UnixTime::from_secs(5000));

        let back = UnixTime::from_secs(6000);
        m.update(&record(true, true, 10.0, 20.0), back);
        assert!(!m.was_idle());
        assert_eq!(m.last_movement_at(), Some(back));
        assert_eq!(m.idle_duration(back.plus_secs(10)), Duration::from_secs(10));
    }

    #[test]
    fn movement_restamps_and_clears_idle() {
        let mut m = member(true, true);
        m.mark_idle();
        let now = UnixTime::from_secs(5000);
        m.update(&record(true, true, 99.0, 20.0), now);

        assert!(!m.was_idle());
        assert_eq!(m.last_movement_at(), Some(now));
        assert_eq!(m.position(), (99.0, 20.0));
    }

    #[test]
    fn idle_flag_cleared_while_offline() {
        let mut m = member(false, true);
        m.mark_idle();
        m.update(&record(false, true, 10.0, 20.0), UnixTime::from_secs(5000));
        assert!(!m.was_idle());
    }

    #[test]
    fn became_idle_requires_stored_online() {
        let offline = member(false, true);
        assert!(!offline.became_idle(&record(false, true, 10.0, 20.0)));

        let online = member(true, true);
        assert!(online.became_idle(&record(true, true, 10.0, 20.0)));
        assert!(!online.became_idle(&record(true, true, 11.0, 20.0)));

        let mut flagged = member(true, true);
        flagged.mark_idle();
        assert!(!flagged.became_idle(&record(true, true, 10.0, 20.0)));
    }

    #[test]
    fn idle_now_respects_threshold() {
        let mut m = member(false, true);
        let online_at = UnixTime::from_secs(1000);
        m.update(&record(true, true, 10.0, 20.0), online_at);

        assert!(!m.idle_now(online_at.plus_secs(59)));
        assert!(m.idle_now(online_at.plus_secs(60)));
        assert!(m.idle_now(online_at.plus_secs(600)));
    }

    #[test]
    fn idle_now_false_without_movement_baseline() {
        // Joined online: no movement or online transition observed yet.
        let m = member(true, true);
        assert!(!m.idle_now(UnixTime::from_secs(999_999)));
        assert_eq!(m.idle_duration(UnixTime::from_secs(999_999)), Duration::ZERO);
    }

    #[test]
    fn alive_and_dead_durations() {
        let m = member(true, true);
        let now = UnixTime::from_secs(1500);
        assert_eq!(m.alive_duration(now), Duration::from_secs(500));
        assert_eq!(m.dead_duration(now), Duration::ZERO);

        let mut rec = record(true, false, 10.0, 20.0);
        rec.spawn_time = UnixTime::UNSET;
        rec.death_time = UnixTime::from_secs(1400);
        let never_spawned = Member::new(&rec, THRESHOLD);
        assert_eq!(never_spawned.alive_duration(now), Duration::ZERO);
        assert_eq!(never_spawned.dead_duration(now), Duration::from_secs(100));
    }

    #[test]
    fn raw_fields_mirror_latest_record() {
        let mut m = member(true, true);
        let mut incoming = record(true, true, 1.0, 2.0);
        incoming.name = "bob".to_string();
        incoming.spawn_time = UnixTime::from_secs(3000);
        m.update(&incoming, UnixTime::from_secs(3001));

        assert_eq!(m.name(), "bob");
        assert_eq!(m.position(), (1.0, 2.0));
        assert_eq!(m.spawn_time(), UnixTime::from_secs(3000));
        assert!(!m.name_changed(&incoming));
        assert!(!m.spawn_time_changed(&incoming));
        assert!(!m.identity_changed(&incoming));
    }
}
