//! The reminder entity and its dedup key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single pending reminder.
///
/// Created by [`crate::ReminderEngine::add_reminder`], transitioned by the
/// phase scheduler (`vibrating` set during the pre-alert window, `notified`
/// set on the final fire) and removed either right after firing or by the
/// cleanup sweeper once stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    /// Originating lecture, owned by the external collaborator.
    pub lecture_id: String,
    pub user_id: String,
    /// Absolute UTC instant at which the final alert fires. Immutable.
    pub reminder_time: DateTime<Utc>,
    /// User-facing alert text, fixed at creation.
    pub message: String,
    /// False until the final alert has fired exactly once. Monotonic.
    #[serde(default)]
    pub notified: bool,
    /// True while the reminder is in its pre-alert window. Advisory only.
    #[serde(default)]
    pub vibrating: bool,
}

impl Reminder {
    pub fn new(
        lecture_id: impl Into<String>,
        user_id: impl Into<String>,
        reminder_time: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            lecture_id: lecture_id.into(),
            user_id: user_id.into(),
            reminder_time,
            message: message.into(),
            notified: false,
            vibrating: false,
        }
    }

    pub fn key(&self) -> ReminderKey {
        ReminderKey {
            lecture_id: self.lecture_id.clone(),
            reminder_time: self.reminder_time,
            user_id: self.user_id.clone(),
        }
    }

    /// Signed time left until the final fire; negative when past due.
    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.reminder_time - now
    }
}

/// Uniqueness key: two reminders for the same lecture, instant and user
/// are the same reminder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReminderKey {
    pub lecture_id: String,
    pub reminder_time: DateTime<Utc>,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_reminder_starts_unnotified() {
        let r = Reminder::new("lec-1", "user-1", Utc::now(), "soon");
        assert!(!r.notified);
        assert!(!r.vibrating);
    }

    #[test]
    fn same_triple_same_key() {
        let at = Utc::now();
        let a = Reminder::new("lec-1", "user-1", at, "a");
        let b = Reminder::new("lec-1", "user-1", at, "b");
        assert_ne!(a.id, b.id);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn different_user_different_key() {
        let at = Utc::now();
        let a = Reminder::new("lec-1", "user-1", at, "a");
        let b = Reminder::new("lec-1", "user-2", at, "a");
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn remaining_is_negative_past_due() {
        let now = Utc::now();
        let r = Reminder::new("lec-1", "user-1", now - Duration::minutes(1), "late");
        assert!(r.remaining(now) < Duration::zero());
    }
}
