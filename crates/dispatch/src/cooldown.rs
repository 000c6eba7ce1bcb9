//! Per-(user, command) cooldowns.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use dashmap::{DashMap, mapref::entry::Entry};

pub const DEFAULT_PRUNE_EVERY: u64 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    Allowed,
    Denied { retry_after: Duration },
}

impl CooldownDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CooldownKey {
    user_id: String,
    command: String,
}

/// Start and length of an active cooldown. Kept as a pair rather than an
/// expiry `Instant` so arbitrarily long durations never overflow.
#[derive(Debug, Clone, Copy)]
struct CooldownWindow {
    started: Instant,
    duration: Duration,
}

impl CooldownWindow {
    fn remaining_at(&self, now: Instant) -> Duration {
        self.duration
            .saturating_sub(now.saturating_duration_since(self.started))
    }
}

/// Tracks when each user may next run each command.
///
/// Expired entries are swept every `prune_every` checks; a swept entry and an
/// expired one behave identically, so pruning never changes a decision.
#[derive(Debug)]
pub struct CooldownTracker {
    windows: DashMap<CooldownKey, CooldownWindow>,
    checks: AtomicU64,
    prune_every: u64,
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new(DEFAULT_PRUNE_EVERY)
    }
}

impl CooldownTracker {
    /// `prune_every` of 0 is treated as 1.
    pub fn new(prune_every: u64) -> Self {
        Self {
            windows: DashMap::new(),
            checks: AtomicU64::new(0),
            prune_every: prune_every.max(1),
        }
    }

    pub fn check(&self, user_id: &str, command: &str, duration: Duration) -> CooldownDecision {
        self.check_at(user_id, command, duration, Instant::now())
    }

    pub fn check_at(
        &self,
        user_id: &str,
        command: &str,
        duration: Duration,
        now: Instant,
    ) -> CooldownDecision {
        if duration.is_zero() {
            return CooldownDecision::Allowed;
        }

        let key = CooldownKey {
            user_id: user_id.to_string(),
            command: command.to_string(),
        };
        let fresh = CooldownWindow {
            started: now,
            duration,
        };
        let decision = match self.windows.entry(key) {
            Entry::Occupied(mut occupied) => {
                let window = occupied.get_mut();
                let retry_after = window.remaining_at(now);
                if retry_after.is_zero() {
                    *window = fresh;
                    CooldownDecision::Allowed
                } else {
                    CooldownDecision::Denied { retry_after }
                }
            },
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                CooldownDecision::Allowed
            },
        };

        self.prune_if_needed(now);
        decision
    }

    /// Drop every entry whose cooldown has elapsed at `now`.
    pub fn prune_expired_at(&self, now: Instant) {
        self.windows
            .retain(|_, window| !window.remaining_at(now).is_zero());
        #[cfg(feature = "metrics")]
        sapphire_metrics::gauge!(sapphire_metrics::cooldowns::ENTRIES).set(self.windows.len() as f64);
    }

    pub fn prune_expired(&self) {
        self.prune_expired_at(Instant::now());
    }

    /// Number of tracked (user, command) pairs, expired or not.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    fn prune_if_needed(&self, now: Instant) {
        let seen = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
        if seen.is_multiple_of(self.prune_every) {
            self.prune_expired_at(now);
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const FIVE: Duration = Duration::from_secs(5);

    #[test]
    fn first_use_allowed_then_denied_until_expiry() {
        let tracker = CooldownTracker::default();
        let t0 = Instant::now();

        assert_eq!(tracker.check_at("u1", "ping", FIVE, t0), CooldownDecision::Allowed);

        let later = t0 + Duration::from_secs(2);
        assert_eq!(
            tracker.check_at("u1", "ping", FIVE, later),
            CooldownDecision::Denied {
                retry_after: Duration::from_secs(3)
            }
        );

        assert!(tracker.check_at("u1", "ping", FIVE, t0 + FIVE).is_allowed());
        // Expiry resets the window.
        assert!(!tracker.check_at("u1", "ping", FIVE, t0 + FIVE + Duration::from_secs(1)).is_allowed());
    }

    #[test]
    fn immediate_retry_reports_full_duration() {
        let tracker = CooldownTracker::default();
        let t0 = Instant::now();
        tracker.check_at("u1", "ping", FIVE, t0);
        assert_eq!(
            tracker.check_at("u1", "ping", FIVE, t0),
            CooldownDecision::Denied { retry_after: FIVE }
        );
    }

    #[test]
    fn keys_are_independent() {
        let tracker = CooldownTracker::default();
        let t0 = Instant::now();
        assert!(tracker.check_at("u1", "ping", FIVE, t0).is_allowed());
        assert!(tracker.check_at("u2", "ping", FIVE, t0).is_allowed());
        assert!(tracker.check_at("u1", "echo", FIVE, t0).is_allowed());
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn zero_duration_records_nothing() {
        let tracker = CooldownTracker::default();
        let t0 = Instant::now();
        for _ in 0..3 {
            assert!(tracker.check_at("u1", "ping", Duration::ZERO, t0).is_allowed());
        }
        assert!(tracker.is_empty());
    }

    #[test]
    fn periodic_prune_drops_only_expired_entries() {
        let tracker = CooldownTracker::new(3);
        let t0 = Instant::now();
        tracker.check_at("old", "ping", Duration::from_secs(1), t0);
        tracker.check_at("live", "ping", Duration::from_secs(60), t0);
        assert_eq!(tracker.len(), 2);

        // Third check triggers a sweep at t0 + 10s.
        let t1 = t0 + Duration::from_secs(10);
        tracker.check_at("new", "ping", FIVE, t1);
        assert_eq!(tracker.len(), 2);
        assert!(!tracker.check_at("live", "ping", Duration::from_secs(60), t1).is_allowed());
        assert!(tracker.check_at("old", "ping", Duration::from_secs(1), t1).is_allowed());
    }

    #[test]
    fn huge_duration_denies_without_overflow() {
        let tracker = CooldownTracker::default();
        let t0 = Instant::now();
        assert!(tracker.check_at("u1", "ban", Duration::MAX, t0).is_allowed());

        let later = t0 + Duration::from_secs(3600);
        assert_eq!(
            tracker.check_at("u1", "ban", Duration::MAX, later),
            CooldownDecision::Denied {
                retry_after: Duration::MAX - Duration::from_secs(3600)
            }
        );
        tracker.prune_expired_at(later);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn manual_prune() {
        let tracker = CooldownTracker::new(u64::MAX);
        let t0 = Instant::now();
        tracker.check_at("u1", "ping", Duration::from_secs(1), t0);
        tracker.prune_expired_at(t0);
        assert_eq!(tracker.len(), 1);
        tracker.prune_expired_at(t0 + Duration::from_secs(1));
        assert!(tracker.is_empty());
    }
}
