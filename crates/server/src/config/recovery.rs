use serde::Deserialize;

/// Labels the recovery boundaries attach to fault reports.
#[derive(Debug, Deserialize)]
pub struct RecoveryConfig {
    /// Subsystem label bound on faults caught by the HTTP boundary.
    #[serde(default = "default_system")]
    pub system: String,
    /// Log message for faults caught by the HTTP boundary.
    #[serde(default = "default_message")]
    pub message: String,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            system: default_system(),
            message: default_message(),
        }
    }
}

fn default_system() -> String {
    "panicguard-server".to_owned()
}

fn default_message() -> String {
    "http server error".to_owned()
}
