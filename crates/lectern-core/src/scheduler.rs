//! Per-reminder phase scheduling.
//!
//! Each armed reminder runs one task that walks the phase machine:
//!
//! ```text
//! Dormant -> PreAlert -> Fired
//!    \          \
//!     +----------+--> Cancelled (delete before the due time)
//! ```
//!
//! Phase selection is computed from `reminder_time - now` at every
//! (re-)evaluation, never from deltas accumulated across re-entries, so
//! it stays consistent across process suspension. The armed deadline
//! itself uses the tokio monotonic clock.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::time::{interval_at, sleep, sleep_until, Instant};

use crate::dispatch::patterns;
use crate::engine::{EngineInner, TimerLease};

/// Phase of a single reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// More than the grace window remains. No side effects.
    Dormant,
    /// Within the grace window: gentle pulses until the due time.
    PreAlert,
    /// Due time reached (or already past at creation).
    Fired,
    /// Terminal: deleted before firing.
    Cancelled,
}

impl Phase {
    /// Select the phase for a signed remaining duration.
    ///
    /// `remaining <= 0` always means an immediate fire, however negative;
    /// `remaining <= grace` enters pre-alert directly, never via a
    /// spurious dormant cycle. Cancellation is only ever reached through
    /// `delete`, not through selection.
    pub fn select(remaining: chrono::Duration, grace: chrono::Duration) -> Phase {
        if remaining <= chrono::Duration::zero() {
            Phase::Fired
        } else if remaining <= grace {
            Phase::PreAlert
        } else {
            Phase::Dormant
        }
    }
}

/// Drive one reminder through its phases until it fires, is cancelled,
/// or turns out to be gone/notified already (idempotent re-evaluation).
pub(crate) async fn run(inner: Arc<EngineInner>, lease: TimerLease) {
    loop {
        if lease.token.is_cancelled() {
            return;
        }
        let Some(reminder) = inner.snapshot(lease.id) else {
            inner.forget_timer(&lease);
            return;
        };
        if reminder.notified {
            inner.forget_timer(&lease);
            return;
        }

        let grace = inner.config.grace_chrono();
        let remaining = reminder.remaining(Utc::now());
        match Phase::select(remaining, grace) {
            Phase::Fired => {
                inner.fire(&lease);
                return;
            }
            Phase::PreAlert => {
                pre_alert(&inner, &lease, remaining).await;
                return;
            }
            Phase::Dormant => {
                // Sleep until the grace boundary, then re-evaluate
                // against the wall clock.
                let wait = (remaining - grace).to_std().unwrap_or_default();
                tokio::select! {
                    _ = lease.token.cancelled() => return,
                    _ = sleep(wait) => {}
                }
            }
            Phase::Cancelled => return,
        }
    }
}

/// Pre-alert window: pulse every `pulse_interval` while unnotified, with
/// a one-shot deadline for the final fire.
async fn pre_alert(inner: &Arc<EngineInner>, lease: &TimerLease, remaining: chrono::Duration) {
    if let Err(e) = inner.set_vibrating(lease.id, true) {
        tracing::warn!(id = %lease.id, "failed to persist pre-alert flag: {e}");
    }

    let fire_at = Instant::now() + remaining.to_std().unwrap_or_default();
    let pulse_every = inner.config.pulse_interval;
    let mut pulse = interval_at(Instant::now() + pulse_every, pulse_every);

    loop {
        tokio::select! {
            _ = lease.token.cancelled() => return,
            _ = sleep_until(fire_at) => {
                inner.fire(lease);
                return;
            }
            _ = pulse.tick() => {
                match inner.snapshot(lease.id) {
                    Some(r) if !r.notified => inner.dispatcher.vibrate(patterns::GENTLE),
                    _ => {
                        inner.forget_timer(lease);
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    const GRACE: i64 = 600;

    #[test]
    fn selection_boundaries() {
        let grace = Duration::seconds(GRACE);
        assert_eq!(Phase::select(Duration::seconds(0), grace), Phase::Fired);
        assert_eq!(Phase::select(Duration::seconds(-1), grace), Phase::Fired);
        assert_eq!(Phase::select(Duration::seconds(1), grace), Phase::PreAlert);
        assert_eq!(Phase::select(Duration::seconds(GRACE), grace), Phase::PreAlert);
        assert_eq!(
            Phase::select(Duration::seconds(GRACE + 1), grace),
            Phase::Dormant
        );
    }

    proptest! {
        #[test]
        fn nonpositive_remaining_always_fires(secs in -1_000_000i64..=0) {
            prop_assert_eq!(
                Phase::select(Duration::seconds(secs), Duration::seconds(GRACE)),
                Phase::Fired
            );
        }

        #[test]
        fn within_grace_always_prealerts(secs in 1i64..=GRACE) {
            prop_assert_eq!(
                Phase::select(Duration::seconds(secs), Duration::seconds(GRACE)),
                Phase::PreAlert
            );
        }

        #[test]
        fn beyond_grace_stays_dormant(secs in (GRACE + 1)..1_000_000i64) {
            prop_assert_eq!(
                Phase::select(Duration::seconds(secs), Duration::seconds(GRACE)),
                Phase::Dormant
            );
        }
    }
}
