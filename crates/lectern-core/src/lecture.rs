//! Lecture feed records consumed from the external collaborator.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A lecture as supplied by the collaborator feed. The engine never
/// mutates lectures; it only derives reminder times from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lecture {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub user_id: String,
}

impl Lecture {
    /// Lecture start as a UTC instant.
    pub fn starts_at(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.date.and_time(self.time))
    }

    /// The alert text used for reminders derived from this lecture.
    pub fn reminder_message(&self) -> String {
        format!("Your lecture \"{}\" starts soon!", self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn lecture() -> Lecture {
        Lecture {
            id: "lec-1".into(),
            title: "Linear Algebra".into(),
            date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            user_id: "user-1".into(),
        }
    }

    #[test]
    fn starts_at_combines_date_and_time() {
        let at = lecture().starts_at();
        assert_eq!(at.year(), 2026);
        assert_eq!(at.month(), 9);
        assert_eq!(at.day(), 1);
        assert_eq!(at.hour(), 14);
        assert_eq!(at.minute(), 30);
    }

    #[test]
    fn message_contains_title() {
        assert_eq!(
            lecture().reminder_message(),
            "Your lecture \"Linear Algebra\" starts soon!"
        );
    }
}
