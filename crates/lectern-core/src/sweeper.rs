//! Periodic cleanup of stale reminders.
//!
//! Reclaims records whose phase scheduler never got to run, e.g. the
//! process was torn down before pre-alert and restarted after the due
//! time plus grace had already elapsed.

use std::sync::Arc;

use tokio::time::{interval, MissedTickBehavior};

use crate::engine::EngineInner;

pub(crate) async fn run(inner: Arc<EngineInner>) {
    let mut ticker = interval(inner.config.sweep_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the boot sequence has
    // already swept by the time the sweeper starts.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if let Err(e) = inner.cleanup_now() {
            tracing::warn!("cleanup sweep failed: {e}");
        }
    }
}
