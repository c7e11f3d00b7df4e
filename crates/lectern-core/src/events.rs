use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every externally visible state change in the engine produces an Event.
/// UIs subscribe through an [`EventSink`]; the engine itself has no
/// dependency on any particular front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ReminderAdded {
        id: Uuid,
        lecture_id: String,
        reminder_time: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// The final alert for a reminder fired.
    ReminderFired {
        id: Uuid,
        message: String,
        at: DateTime<Utc>,
    },
    /// A reminder was deleted before it fired.
    ReminderCancelled {
        id: Uuid,
        at: DateTime<Utc>,
    },
    /// In-app transient banner, shown when a system notification is not
    /// available. Carries the same text the notification would have.
    BannerShown {
        title: String,
        message: String,
        at: DateTime<Utc>,
    },
    /// A cleanup pass removed stale reminders.
    SweepCompleted {
        removed: usize,
        at: DateTime<Utc>,
    },
    /// All reminders were removed at teardown.
    StoreCleared {
        at: DateTime<Utc>,
    },
}

/// Observer interface for engine events.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: Event);
}

/// Sink that drops every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: Event) {}
}

/// Sink that emits events as structured log lines.
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&self, event: Event) {
        match serde_json::to_string(&event) {
            Ok(json) => tracing::info!(event = %json, "engine event"),
            Err(e) => tracing::warn!("failed to serialize event: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::SweepCompleted {
            removed: 3,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SweepCompleted");
        assert_eq!(json["removed"], 3);
    }

    #[test]
    fn banner_event_roundtrips() {
        let event = Event::BannerShown {
            title: "Lecture Reminder".into(),
            message: "starts soon".into(),
            at: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        match parsed {
            Event::BannerShown { title, message, .. } => {
                assert_eq!(title, "Lecture Reminder");
                assert_eq!(message, "starts soon");
            }
            _ => panic!("Expected BannerShown"),
        }
    }
}
