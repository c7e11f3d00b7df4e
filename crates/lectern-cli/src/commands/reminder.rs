use chrono::{DateTime, Utc};
use clap::Subcommand;
use uuid::Uuid;

use crate::common;

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Add a reminder
    Add {
        /// Originating lecture id
        #[arg(long)]
        lecture_id: String,
        /// Owner of the reminder
        #[arg(long)]
        user_id: String,
        /// RFC 3339 timestamp of the final alert
        #[arg(long)]
        at: DateTime<Utc>,
        /// Alert text
        #[arg(long)]
        message: String,
    },
    /// Print pending reminders as JSON
    List,
    /// Delete a reminder and cancel its timers
    Delete { id: Uuid },
    /// Run one cleanup pass
    Cleanup,
    /// Remove all reminders
    Clear,
}

pub async fn run(action: ReminderAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = common::open_engine()?;

    match action {
        ReminderAction::Add {
            lecture_id,
            user_id,
            at,
            message,
        } => {
            let reminder = engine.add_reminder(&lecture_id, &user_id, at, &message)?;
            println!("{}", serde_json::to_string_pretty(&reminder)?);
        }
        ReminderAction::List => {
            println!("{}", serde_json::to_string_pretty(&engine.reminders())?);
        }
        ReminderAction::Delete { id } => {
            engine.delete_reminder(id)?;
            println!("{{\"type\": \"reminder_deleted\"}}");
        }
        ReminderAction::Cleanup => {
            let removed = engine.cleanup_expired_reminders()?;
            println!("{{\"type\": \"cleanup\", \"removed\": {removed}}}");
        }
        ReminderAction::Clear => {
            engine.clear()?;
            println!("{{\"type\": \"cleared\"}}");
        }
    }
    Ok(())
}
