//! Reminder storage and persistence.
//!
//! The store is the persisted source of truth for pending reminders:
//! pure data plus mutation operations, no timers. Every mutation rewrites
//! a single JSON blob `{ "reminders": [...] }` atomically (temp file +
//! rename). An unreadable blob at startup is treated as an empty store,
//! never as a fatal error.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::reminder::{Reminder, ReminderKey};
use crate::storage::data_dir;

/// Wrapper for the serialized blob.
#[derive(Serialize, Deserialize, Default)]
struct RemindersFile {
    reminders: Vec<Reminder>,
}

/// File-backed collection of pending reminders.
pub struct ReminderStore {
    path: Option<PathBuf>,
    reminders: Vec<Reminder>,
}

impl ReminderStore {
    /// Open the store at the default data directory, loading any
    /// persisted reminders.
    pub fn open() -> Result<Self, crate::error::CoreError> {
        let dir = data_dir().map_err(|e| crate::error::CoreError::Custom(e.to_string()))?;
        Ok(Self::with_path(dir.join("reminders.json")))
    }

    /// Open a store backed by a specific file.
    pub fn with_path(path: PathBuf) -> Self {
        let reminders = Self::load_from(&path);
        Self {
            path: Some(path),
            reminders,
        }
    }

    /// A store with no backing file. Used in tests and by collaborators
    /// that manage persistence themselves.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            reminders: Vec::new(),
        }
    }

    fn load_from(path: &PathBuf) -> Vec<Reminder> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str::<RemindersFile>(&content) {
            Ok(file) => file.reminders,
            Err(e) => {
                // Corrupt blob: start fresh rather than refuse to boot.
                tracing::warn!(path = %path.display(), "unreadable reminder blob, starting empty: {e}");
                Vec::new()
            }
        }
    }

    /// Add a reminder, idempotent by the `(lecture_id, reminder_time,
    /// user_id)` dedup key. Returns the record and whether it was newly
    /// created; an existing record is returned unchanged.
    pub fn add(
        &mut self,
        lecture_id: &str,
        user_id: &str,
        reminder_time: DateTime<Utc>,
        message: &str,
    ) -> Result<(Reminder, bool), StoreError> {
        let key = ReminderKey {
            lecture_id: lecture_id.to_string(),
            reminder_time,
            user_id: user_id.to_string(),
        };
        if let Some(existing) = self.reminders.iter().find(|r| r.key() == key) {
            return Ok((existing.clone(), false));
        }

        let reminder = Reminder::new(lecture_id, user_id, reminder_time, message);
        self.reminders.push(reminder.clone());
        self.persist()?;
        Ok((reminder, true))
    }

    /// Remove the record unconditionally. Returns whether it existed.
    /// Timer cancellation is the coordinator's responsibility.
    pub fn delete(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let before = self.reminders.len();
        self.reminders.retain(|r| r.id != id);
        let removed = self.reminders.len() != before;
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Set `notified = true` (and clear the advisory `vibrating` flag).
    /// No-op if the id is absent. `notified` is monotonic: this never
    /// resets it to false.
    pub fn mark_notified(&mut self, id: Uuid) -> Result<bool, StoreError> {
        match self.reminders.iter_mut().find(|r| r.id == id) {
            Some(r) => {
                r.notified = true;
                r.vibrating = false;
                self.persist()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Flip the advisory pre-alert flag.
    pub fn set_vibrating(&mut self, id: Uuid, vibrating: bool) -> Result<(), StoreError> {
        if let Some(r) = self.reminders.iter_mut().find(|r| r.id == id) {
            if r.vibrating != vibrating {
                r.vibrating = vibrating;
                self.persist()?;
            }
        }
        Ok(())
    }

    /// Remove every record where `now - reminder_time >= grace`. Records
    /// not yet due, or due within the grace window, are retained.
    /// Returns the removed records so the coordinator can cancel their
    /// timers.
    pub fn cleanup_expired(
        &mut self,
        now: DateTime<Utc>,
        grace: Duration,
    ) -> Result<Vec<Reminder>, StoreError> {
        let (stale, live): (Vec<_>, Vec<_>) = self
            .reminders
            .drain(..)
            .partition(|r| now - r.reminder_time >= grace);
        self.reminders = live;
        if !stale.is_empty() {
            self.persist()?;
        }
        Ok(stale)
    }

    /// Remove all records. Used only at logout-equivalent teardown.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        if !self.reminders.is_empty() {
            self.reminders.clear();
            self.persist()?;
        }
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<&Reminder> {
        self.reminders.iter().find(|r| r.id == id)
    }

    pub fn all(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }

    /// Rewrite the blob. Atomic: temp file + rename prevents partial reads.
    fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let file = RemindersFile {
            reminders: self.reminders.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let tmp_path = path.with_extension("tmp");
        let write = |source: std::io::Error| StoreError::WriteFailed {
            path: path.clone(),
            source,
        };
        std::fs::write(&tmp_path, json.as_bytes()).map_err(write)?;
        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write(e));
        }
        Ok(())
    }
}
