use serde::{Deserialize, Serialize};

use super::channel::DEFAULT_TARGET;

/// User configuration from PDA Counter Config.yaml
///
/// Contains the counting target and where channel state is kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "Counter_Settings", default)]
    pub counter: CounterSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterSettings {
    #[serde(rename = "Target", default = "default_target")]
    pub target: u64,

    #[serde(rename = "Save File", default = "default_save_file")]
    pub save_file: String,

    #[serde(rename = "Save Failure Policy", default)]
    pub save_failure_policy: SaveFailurePolicy,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Log Directory", default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
            save_file: default_save_file(),
            save_failure_policy: SaveFailurePolicy::default(),
            debug_mode: false,
            log_dir: default_log_dir(),
        }
    }
}

/// What a session does when writing channel state fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveFailurePolicy {
    /// Return the error to the caller; the in-memory change is kept
    #[default]
    Propagate,
    /// Log the error and report the operation as successful
    LogAndContinue,
}

fn default_target() -> u64 {
    DEFAULT_TARGET
}

fn default_save_file() -> String {
    crate::persistence::DEFAULT_STATE_FILE.to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}
