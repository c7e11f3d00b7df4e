mod config;

pub use config::{Config, NotificationsConfig, TimingConfig};

use std::path::PathBuf;

/// Returns `~/.config/lectern[-dev]/` based on LECTERN_ENV.
///
/// Set LECTERN_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LECTERN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("lectern-dev")
    } else {
        base_dir.join("lectern")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
