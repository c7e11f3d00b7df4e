//! Terminal alert backend used by the CLI daemon.

use super::{AlertBackend, PermissionState};
use crate::storage::Config;

/// Backend that writes alerts to stdout. Terminals have no haptic
/// subsystem, so vibration requests are dropped by the dispatcher.
pub struct ConsoleBackend {
    permission: PermissionState,
    enabled: bool,
}

impl ConsoleBackend {
    pub fn new(permission: PermissionState) -> Self {
        Self {
            permission,
            enabled: true,
        }
    }

    /// Build from the persisted config: permission comes from
    /// `notifications.permission`, and `notifications.enabled = false`
    /// silences the system channel entirely.
    pub fn from_config(config: &Config) -> Self {
        Self {
            permission: config.notifications.permission,
            enabled: config.notifications.enabled,
        }
    }
}

impl AlertBackend for ConsoleBackend {
    fn haptics_available(&self) -> bool {
        false
    }

    fn vibrate(&self, _pattern: &[u64]) {}

    fn permission(&self) -> PermissionState {
        if self.enabled {
            self.permission
        } else {
            PermissionState::Denied
        }
    }

    fn notify(&self, title: &str, body: &str) -> std::io::Result<()> {
        println!("[{title}] {body}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_reports_denied() {
        let mut config = Config::default();
        config.notifications.permission = PermissionState::Granted;
        config.notifications.enabled = false;
        let backend = ConsoleBackend::from_config(&config);
        assert_eq!(backend.permission(), PermissionState::Denied);
    }

    #[test]
    fn enabled_config_passes_permission_through() {
        let mut config = Config::default();
        config.notifications.permission = PermissionState::Granted;
        let backend = ConsoleBackend::from_config(&config);
        assert_eq!(backend.permission(), PermissionState::Granted);
    }
}
