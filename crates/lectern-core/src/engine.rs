//! Reminder engine coordinator.
//!
//! [`ReminderEngine`] is the public surface collaborators talk to. It
//! owns the only shared mutable state (the reminder store and the per-id
//! timer map) and linearizes all mutations behind its locks. Per-id
//! phase transitions run inside a single spawned task, so they are
//! strictly ordered; nothing is ordered across different ids.
//!
//! Cancellation model: every armed reminder holds a [`TimerLease`] -- a
//! generation-stamped `CancellationToken` registered in the timer map.
//! Deleting a reminder cancels the token before the store mutation, and
//! every timer branch checks the token before acting, so a stale timer
//! callback can never resurrect a deleted record.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::dispatch::{patterns, AlertDispatcher};
use crate::error::{CoreError, Result};
use crate::events::{Event, EventSink};
use crate::lecture::Lecture;
use crate::reminder::Reminder;
use crate::storage::Config;
use crate::store::ReminderStore;
use crate::{scheduler, sweeper};

/// Engine timing knobs. Defaults match the persisted [`Config`]; tests
/// shrink them to millisecond scale.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lead subtracted from a lecture start to derive its reminder time.
    pub lead: StdDuration,
    /// Dormant/pre-alert boundary and sweep staleness cutoff.
    pub grace: StdDuration,
    /// Cadence of the gentle pulse during pre-alert.
    pub pulse_interval: StdDuration,
    /// Cadence of the background cleanup sweeper.
    pub sweep_interval: StdDuration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lead: StdDuration::from_secs(10 * 60),
            grace: StdDuration::from_secs(10 * 60),
            pulse_interval: StdDuration::from_secs(2 * 60),
            sweep_interval: StdDuration::from_secs(5 * 60),
        }
    }
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        Self {
            lead: StdDuration::from_secs(config.timing.lead_minutes * 60),
            grace: StdDuration::from_secs(config.timing.grace_minutes * 60),
            pulse_interval: StdDuration::from_secs(config.timing.pulse_interval_secs),
            sweep_interval: StdDuration::from_secs(config.timing.sweep_interval_secs),
        }
    }
}

impl EngineConfig {
    pub(crate) fn grace_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.grace).unwrap_or_else(|_| chrono::Duration::minutes(10))
    }

    pub(crate) fn lead_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.lead).unwrap_or_else(|_| chrono::Duration::minutes(10))
    }
}

/// One armed timer chain for one reminder id.
pub(crate) struct TimerLease {
    pub(crate) id: Uuid,
    pub(crate) token: CancellationToken,
    generation: u64,
}

struct TimerSlot {
    token: CancellationToken,
    generation: u64,
}

pub(crate) struct EngineInner {
    store: Mutex<ReminderStore>,
    timers: Mutex<HashMap<Uuid, TimerSlot>>,
    next_generation: AtomicU64,
    pub(crate) dispatcher: AlertDispatcher,
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) config: EngineConfig,
}

impl EngineInner {
    fn store(&self) -> MutexGuard<'_, ReminderStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<Uuid, TimerSlot>> {
        self.timers.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn snapshot(&self, id: Uuid) -> Option<Reminder> {
        self.store().get(id).cloned()
    }

    /// Arm a fresh lease for `id`, cancelling any previous chain so at
    /// most one live timer chain exists per id.
    fn register_timer(&self, id: Uuid) -> TimerLease {
        let token = CancellationToken::new();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let mut timers = self.timers();
        if let Some(old) = timers.insert(
            id,
            TimerSlot {
                token: token.clone(),
                generation,
            },
        ) {
            old.token.cancel();
        }
        TimerLease {
            id,
            token,
            generation,
        }
    }

    /// Cancel and drop whatever chain is armed for `id`.
    fn cancel_timer(&self, id: Uuid) {
        if let Some(slot) = self.timers().remove(&id) {
            slot.token.cancel();
        }
    }

    /// Drop a finished lease, but only if it is still the registered one;
    /// a re-armed chain must not be evicted by its predecessor.
    pub(crate) fn forget_timer(&self, lease: &TimerLease) {
        let mut timers = self.timers();
        if timers
            .get(&lease.id)
            .is_some_and(|slot| slot.generation == lease.generation)
        {
            timers.remove(&lease.id);
        }
    }

    pub(crate) fn set_vibrating(&self, id: Uuid, vibrating: bool) -> Result<(), CoreError> {
        self.store().set_vibrating(id, vibrating)?;
        Ok(())
    }

    /// The Fired transition: urgent pulse, notification, mark notified,
    /// delete, stop timers. Idempotent -- a cancelled lease or an
    /// already-notified/absent record makes this a no-op.
    pub(crate) fn fire(&self, lease: &TimerLease) {
        if lease.token.is_cancelled() {
            return;
        }
        let message = match self.store().get(lease.id) {
            Some(r) if !r.notified => Some(r.message.clone()),
            _ => None,
        };
        let Some(message) = message else {
            self.forget_timer(lease);
            return;
        };

        self.dispatcher.vibrate(patterns::URGENT);
        self.dispatcher.notify(&message);

        {
            let mut store = self.store();
            if let Err(e) = store.mark_notified(lease.id) {
                tracing::warn!(id = %lease.id, "failed to persist notified flag: {e}");
            }
            if let Err(e) = store.delete(lease.id) {
                tracing::warn!(id = %lease.id, "failed to delete fired reminder: {e}");
            }
        }
        self.forget_timer(lease);
        self.sink.publish(Event::ReminderFired {
            id: lease.id,
            message,
            at: Utc::now(),
        });
    }

    /// One cleanup pass: purge stale records and cancel their timers.
    pub(crate) fn cleanup_now(&self) -> Result<usize, CoreError> {
        let removed = self
            .store()
            .cleanup_expired(Utc::now(), self.config.grace_chrono())?;
        for reminder in &removed {
            self.cancel_timer(reminder.id);
        }
        if !removed.is_empty() {
            tracing::info!(removed = removed.len(), "swept stale reminders");
            self.sink.publish(Event::SweepCompleted {
                removed: removed.len(),
                at: Utc::now(),
            });
        }
        Ok(removed.len())
    }
}

/// Coordinator for the reminder store, phase scheduler, dispatcher and
/// sweeper. Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct ReminderEngine {
    inner: Arc<EngineInner>,
}

impl ReminderEngine {
    pub fn new(
        store: ReminderStore,
        dispatcher: AlertDispatcher,
        sink: Arc<dyn EventSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                store: Mutex::new(store),
                timers: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                dispatcher,
                sink,
                config,
            }),
        }
    }

    /// Add a reminder, idempotent by `(lecture_id, reminder_time,
    /// user_id)`. A genuinely new record is persisted and its phase
    /// scheduler armed; an existing one is returned unchanged without
    /// touching its timers.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn add_reminder(
        &self,
        lecture_id: &str,
        user_id: &str,
        reminder_time: DateTime<Utc>,
        message: &str,
    ) -> Result<Reminder> {
        let (reminder, _) = self.add_inner(lecture_id, user_id, reminder_time, message)?;
        Ok(reminder)
    }

    fn add_inner(
        &self,
        lecture_id: &str,
        user_id: &str,
        reminder_time: DateTime<Utc>,
        message: &str,
    ) -> Result<(Reminder, bool)> {
        let (reminder, created) = self
            .inner
            .store()
            .add(lecture_id, user_id, reminder_time, message)?;
        if created {
            self.inner.sink.publish(Event::ReminderAdded {
                id: reminder.id,
                lecture_id: reminder.lecture_id.clone(),
                reminder_time: reminder.reminder_time,
                at: Utc::now(),
            });
            self.schedule_evaluation(reminder.id);
        }
        Ok((reminder, created))
    }

    /// Remove a reminder and cancel all of its pending timers. The
    /// cancellation happens before the store mutation, so no alert for
    /// this id can fire afterwards.
    pub fn delete_reminder(&self, id: Uuid) -> Result<()> {
        self.inner.cancel_timer(id);
        let removed = self.inner.store().delete(id)?;
        if removed {
            self.inner.sink.publish(Event::ReminderCancelled {
                id,
                at: Utc::now(),
            });
        }
        Ok(())
    }

    /// Purge every reminder past its due time by more than the grace
    /// window. Returns how many were removed.
    pub fn cleanup_expired_reminders(&self) -> Result<usize> {
        self.inner.cleanup_now()
    }

    /// Set `notified` on a record. No-op if the id is absent. Exposed
    /// mainly for test injection.
    pub fn mark_as_notified(&self, id: Uuid) -> Result<()> {
        self.inner.store().mark_notified(id)?;
        Ok(())
    }

    /// Remove all reminders and cancel every timer. Logout-equivalent
    /// teardown.
    pub fn clear(&self) -> Result<()> {
        {
            let mut timers = self.inner.timers();
            for (_, slot) in timers.drain() {
                slot.token.cancel();
            }
        }
        self.inner.store().clear()?;
        self.inner.sink.publish(Event::StoreCleared { at: Utc::now() });
        Ok(())
    }

    /// (Re-)arm the phase scheduler for one reminder id, replacing any
    /// previous timer chain. Fire-and-forget.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule_evaluation(&self, id: Uuid) {
        let lease = self.inner.register_timer(id);
        let inner = self.inner.clone();
        tokio::spawn(scheduler::run(inner, lease));
    }

    /// Two-step boot sequence after the store has loaded its persisted
    /// contents: sweep once synchronously, then re-arm the phase
    /// scheduler for every remaining unnotified reminder. Records the
    /// sweep removed can no longer fire, so no duplicate or stale alerts
    /// are generated across restarts.
    ///
    /// Returns the number of reminders re-armed.
    pub fn bootstrap(&self) -> Result<usize> {
        self.inner.cleanup_now()?;
        let ids: Vec<Uuid> = self
            .inner
            .store()
            .all()
            .iter()
            .filter(|r| !r.notified)
            .map(|r| r.id)
            .collect();
        for id in &ids {
            self.schedule_evaluation(*id);
        }
        tracing::info!(armed = ids.len(), "rehydrated reminder timers");
        Ok(ids.len())
    }

    /// Spawn the background sweeper, which runs a cleanup pass on a fixed
    /// cadence for the life of the process.
    pub fn start_sweeper(&self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(sweeper::run(self.inner.clone()))
    }

    /// Derive reminders from a lecture feed: one reminder per lecture at
    /// `start - lead`, future ones only, with the standard message text.
    /// Ends with a cleanup pass. Returns the newly created reminders.
    pub fn sync_lectures(&self, lectures: &[Lecture], user_id: &str) -> Result<Vec<Reminder>> {
        let now = Utc::now();
        let lead = self.inner.config.lead_chrono();
        let mut created = Vec::new();
        for lecture in lectures {
            let reminder_time = lecture.starts_at() - lead;
            if reminder_time <= now {
                continue;
            }
            let (reminder, was_created) =
                self.add_inner(&lecture.id, user_id, reminder_time, &lecture.reminder_message())?;
            if was_created {
                created.push(reminder);
            }
        }
        self.inner.cleanup_now()?;
        Ok(created)
    }

    /// Snapshot of all pending reminders.
    pub fn reminders(&self) -> Vec<Reminder> {
        self.inner.store().all().to_vec()
    }

    pub fn get(&self, id: Uuid) -> Option<Reminder> {
        self.inner.snapshot(id)
    }

    /// Number of ids with an armed timer chain. For inspection and tests.
    pub fn active_timers(&self) -> usize {
        self.inner.timers().len()
    }
}
