use std::time::Duration;

/// Seconds a member must sit still (while online) before counting as idle
pub const DEFAULT_IDLE_SECONDS: u64 = 300;

/// Default idle threshold used by `RosterConfig::default`
pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(DEFAULT_IDLE_SECONDS);
