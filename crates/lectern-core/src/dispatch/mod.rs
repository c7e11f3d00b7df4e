//! Alert dispatch: haptic pulses and notifications.
//!
//! The dispatcher is stateless. It executes side effects for the phase
//! scheduler against a platform [`AlertBackend`] and swallows every
//! failure: a denied permission falls back to an in-app banner event, an
//! absent capability becomes a debug-logged no-op. Nothing here ever
//! returns an error to the engine.

mod console;

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::{Event, EventSink};

pub use console::ConsoleBackend;

/// Title used for both system notifications and banner fallbacks.
pub const ALERT_TITLE: &str = "Lecture Reminder";

/// Vibration patterns (millisecond on/off segments).
pub mod patterns {
    /// Gentle cue pulsed during the pre-alert window.
    pub const GENTLE: &[u64] = &[200, 100, 200];
    /// Urgent cue for the final fire.
    pub const URGENT: &[u64] = &[400, 200, 400];
}

/// Platform notification permission, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    Undetermined,
}

impl Default for PermissionState {
    fn default() -> Self {
        PermissionState::Undetermined
    }
}

/// Platform capabilities the dispatcher drives.
pub trait AlertBackend: Send + Sync {
    /// Whether the host has a haptic subsystem at all.
    fn haptics_available(&self) -> bool;

    /// Run a vibration pattern. Only called when haptics are available.
    fn vibrate(&self, pattern: &[u64]);

    /// Current notification permission.
    fn permission(&self) -> PermissionState;

    /// Post a system-level notification.
    fn notify(&self, title: &str, body: &str) -> std::io::Result<()>;
}

/// Stateless side-effect executor for the phase scheduler.
#[derive(Clone)]
pub struct AlertDispatcher {
    backend: Arc<dyn AlertBackend>,
    sink: Arc<dyn EventSink>,
}

impl AlertDispatcher {
    pub fn new(backend: Arc<dyn AlertBackend>, sink: Arc<dyn EventSink>) -> Self {
        Self { backend, sink }
    }

    /// Best-effort haptic pulse; no-op without a haptic subsystem.
    pub fn vibrate(&self, pattern: &[u64]) {
        if !self.backend.haptics_available() {
            tracing::debug!("no haptic subsystem, skipping vibration");
            return;
        }
        self.backend.vibrate(pattern);
    }

    /// Deliver `message`, via a system notification when permission is
    /// granted, otherwise as an in-app banner event. Never fails.
    pub fn notify(&self, message: &str) {
        match self.backend.permission() {
            PermissionState::Granted => {
                if let Err(e) = self.backend.notify(ALERT_TITLE, message) {
                    tracing::warn!("system notification failed, showing banner: {e}");
                    self.banner(message);
                }
            }
            state => {
                tracing::debug!(?state, "notification permission not granted, showing banner");
                self.banner(message);
            }
        }
    }

    fn banner(&self, message: &str) {
        self.sink.publish(Event::BannerShown {
            title: ALERT_TITLE.to_string(),
            message: message.to_string(),
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        haptics: bool,
        permission: PermissionState,
        fail_notify: bool,
        vibrations: Mutex<Vec<Vec<u64>>>,
        notifications: Mutex<Vec<String>>,
    }

    impl AlertBackend for FakeBackend {
        fn haptics_available(&self) -> bool {
            self.haptics
        }

        fn vibrate(&self, pattern: &[u64]) {
            self.vibrations.lock().unwrap().push(pattern.to_vec());
        }

        fn permission(&self) -> PermissionState {
            self.permission
        }

        fn notify(&self, _title: &str, body: &str) -> std::io::Result<()> {
            if self.fail_notify {
                return Err(std::io::Error::other("no notification daemon"));
            }
            self.notifications.lock().unwrap().push(body.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct BannerCounter(Mutex<Vec<Event>>);

    impl EventSink for BannerCounter {
        fn publish(&self, event: Event) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn dispatcher(backend: FakeBackend) -> (AlertDispatcher, Arc<FakeBackend>, Arc<BannerCounter>) {
        let backend = Arc::new(backend);
        let sink = Arc::new(BannerCounter::default());
        (
            AlertDispatcher::new(backend.clone(), sink.clone()),
            backend,
            sink,
        )
    }

    #[test]
    fn vibrate_noop_without_haptics() {
        let (dispatch, backend, _) = dispatcher(FakeBackend::default());
        dispatch.vibrate(patterns::GENTLE);
        assert!(backend.vibrations.lock().unwrap().is_empty());
    }

    #[test]
    fn vibrate_forwards_pattern() {
        let (dispatch, backend, _) = dispatcher(FakeBackend {
            haptics: true,
            ..Default::default()
        });
        dispatch.vibrate(patterns::URGENT);
        assert_eq!(backend.vibrations.lock().unwrap().as_slice(), &[vec![400, 200, 400]]);
    }

    #[test]
    fn notify_uses_system_when_granted() {
        let (dispatch, backend, sink) = dispatcher(FakeBackend {
            permission: PermissionState::Granted,
            ..Default::default()
        });
        dispatch.notify("starts soon");
        assert_eq!(backend.notifications.lock().unwrap().as_slice(), &["starts soon"]);
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[test]
    fn notify_falls_back_to_banner_when_denied() {
        let (dispatch, backend, sink) = dispatcher(FakeBackend {
            permission: PermissionState::Denied,
            ..Default::default()
        });
        dispatch.notify("starts soon");
        assert!(backend.notifications.lock().unwrap().is_empty());

        let events = sink.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::BannerShown { title, message, .. } => {
                assert_eq!(title, ALERT_TITLE);
                assert_eq!(message, "starts soon");
            }
            other => panic!("Expected BannerShown, got {other:?}"),
        }
    }

    #[test]
    fn notify_falls_back_to_banner_on_failure() {
        let (dispatch, _, sink) = dispatcher(FakeBackend {
            permission: PermissionState::Granted,
            fail_notify: true,
            ..Default::default()
        });
        dispatch.notify("starts soon");
        assert_eq!(sink.0.lock().unwrap().len(), 1);
    }
}
