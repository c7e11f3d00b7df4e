//! # Lectern Core Library
//!
//! Lectern turns future-dated lectures into time-triggered, multi-phase
//! alerts that survive process restarts, never double-fire, and
//! self-clean once stale. The CLI binary is a thin layer over this
//! library; any other front end can embed it the same way.
//!
//! ## Architecture
//!
//! - **Reminder Store**: the persisted source of truth, a JSON blob
//!   rewritten atomically on every mutation
//! - **Phase Scheduler**: per-reminder state machine (dormant ->
//!   pre-alert -> fired) driven by cancellable tokio timers
//! - **Alert Dispatcher**: stateless side-effect executor with a
//!   permission-gated notification channel and banner fallback
//! - **Cleanup Sweeper**: background task purging reminders past their
//!   due time by more than the grace window
//! - **Bootstrap**: load -> sweep once -> re-arm, run by the process
//!   entry point after a restart
//!
//! ## Key Components
//!
//! - [`ReminderEngine`]: coordinator and public surface
//! - [`ReminderStore`]: reminder persistence
//! - [`AlertDispatcher`]: haptic and notification delivery
//! - [`Config`]: application configuration management

pub mod dispatch;
pub mod engine;
pub mod error;
pub mod events;
pub mod lecture;
pub mod reminder;
pub mod scheduler;
pub mod storage;
pub mod store;
mod sweeper;

pub use dispatch::{AlertBackend, AlertDispatcher, ConsoleBackend, PermissionState};
pub use engine::{EngineConfig, ReminderEngine};
pub use error::{ConfigError, CoreError, StoreError};
pub use events::{Event, EventSink, LogSink, NullSink};
pub use lecture::Lecture;
pub use reminder::{Reminder, ReminderKey};
pub use scheduler::Phase;
pub use storage::Config;
pub use store::ReminderStore;
