use std::path::PathBuf;

use clap::Subcommand;
use lectern_core::Lecture;

use crate::common;

#[derive(Subcommand)]
pub enum LectureAction {
    /// Create reminders from a lecture feed JSON file
    Sync {
        /// Path to a JSON array of lectures
        file: PathBuf,
        /// Owner of the created reminders
        #[arg(long)]
        user_id: String,
    },
}

pub async fn run(action: LectureAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        LectureAction::Sync { file, user_id } => {
            let content = std::fs::read_to_string(&file)?;
            let lectures: Vec<Lecture> = serde_json::from_str(&content)?;

            let engine = common::open_engine()?;
            let created = engine.sync_lectures(&lectures, &user_id)?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
    }
    Ok(())
}
