use std::path::PathBuf;
use std::time::Duration;

use botweaver_common::config::SupervisorSettings;

/// Runtime knobs for a [`ProcessSupervisor`](crate::ProcessSupervisor).
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Per-run staging directories are created under this root.
    pub staging_root: PathBuf,
    /// Program + args run in the staging directory before the bot starts.
    /// Empty skips the install step.
    pub install_command: Vec<String>,
    /// Program + args that start the generated entrypoint.
    pub runtime_command: Vec<String>,
    pub install_timeout: Duration,
    pub cleanup_delay: Duration,
    pub stop_grace: Duration,
    pub log_capacity: usize,
    pub status_tail: usize,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self::from(&SupervisorSettings::default())
    }
}

impl From<&SupervisorSettings> for SupervisorConfig {
    fn from(s: &SupervisorSettings) -> Self {
        Self {
            staging_root: s.staging_dir.clone(),
            install_command: s.install_command.clone(),
            runtime_command: s.runtime_command.clone(),
            install_timeout: s.install_timeout(),
            cleanup_delay: s.cleanup_delay(),
            stop_grace: s.stop_grace(),
            log_capacity: s.log_capacity.max(1),
            status_tail: s.status_tail,
        }
    }
}
