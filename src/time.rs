use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Unix timestamp in whole seconds.
///
/// The upstream snapshot source reports spawn and death times in this unit,
/// with `0` standing for "never happened"; see [`UnixTime::is_unset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixTime(u64);

impl UnixTime {
    /// Sentinel for "never happened", matching the upstream convention
    pub const UNSET: UnixTime = UnixTime(0);

    /// Current wall-clock time
    pub fn now() -> Self {
        UnixTime(Utc::now().timestamp().max(0) as u64)
    }

    pub fn from_secs(secs: u64) -> Self {
        UnixTime(secs)
    }

    pub fn as_secs(self) -> u64 {
        self.0
    }

    /// True for the `0` sentinel
    pub fn is_unset(self) -> bool {
        self.0 == 0
    }

    /// Seconds elapsed from `earlier` up to `self`, clamped at zero
    pub fn saturating_since(self, earlier: UnixTime) -> Duration {
        Duration::from_secs(self.0.saturating_sub(earlier.0))
    }

    /// Shift forward by whole seconds
    pub fn plus_secs(self, secs: u64) -> Self {
        UnixTime(self.0.saturating_add(secs))
    }
}

impl From<u64> for UnixTime {
    fn from(secs: u64) -> Self {
        UnixTime(secs)
    }
}

impl fmt::Display for UnixTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::<Utc>::from_timestamp(self.0 as i64, 0) {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_sentinel() {
        assert!(UnixTime::UNSET.is_unset());
        assert!(UnixTime::from_secs(0).is_unset());
        assert!(!UnixTime::from_secs(1).is_unset());
    }

    #[test]
    fn saturating_since_clamps_at_zero() {
        let earlier = UnixTime::from_secs(100);
        let later = UnixTime::from_secs(160);
        assert_eq!(later.saturating_since(earlier), Duration::from_secs(60));
        assert_eq!(earlier.saturating_since(later), Duration::ZERO);
    }

    #[test]
    fn plus_secs_shifts() {
        assert_eq!(UnixTime::from_secs(10).plus_secs(5), UnixTime::from_secs(15));
    }
}
