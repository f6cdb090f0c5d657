//! Registry entries and the read-only views handed to callers.

use botweaver_common::models::BotConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use crate::logs::{LogBuffer, LogEntry};

/// Lifecycle of one hosted bot.
///
/// `Staging → Installing → Running → Stopping → Exited`; a stop request can
/// move any earlier state straight to `Stopping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BotState {
    Staging,
    Installing,
    Running,
    Stopping,
    Exited,
}

impl BotState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Installing => "installing",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Exited => "exited",
        }
    }

    /// States a transition to `next` is allowed from.
    pub fn can_become(self, next: BotState) -> bool {
        use BotState::*;
        matches!(
            (self, next),
            (Staging, Installing)
                | (Installing, Running)
                | (Staging | Installing | Running, Stopping)
                | (Running | Stopping, Exited)
        )
    }
}

impl std::fmt::Display for BotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The supervisor's record of one bot, from `start` until its process exits.
#[derive(Debug)]
pub struct BotHandle {
    pub id: String,
    /// Distinguishes this run from later runs reusing the same id.
    pub run_id: Uuid,
    /// The configuration this run was started from, credential blanked.
    pub config: BotConfig,
    pub state: BotState,
    pub started_at: DateTime<Utc>,
    pub pid: Option<u32>,
    pub logs: LogBuffer,
    pub(crate) stop_tx: watch::Sender<bool>,
}

impl BotHandle {
    pub(crate) fn new(id: String, config: &BotConfig, log_capacity: usize) -> (Self, watch::Receiver<bool>) {
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = Self {
            id,
            run_id: Uuid::now_v7(),
            config: config.redacted(),
            state: BotState::Staging,
            started_at: Utc::now(),
            pid: None,
            logs: LogBuffer::new(log_capacity),
            stop_tx,
        };
        (handle, stop_rx)
    }

    /// Apply `next` if the state machine allows it.
    pub(crate) fn transition(&mut self, next: BotState) -> bool {
        if self.state.can_become(next) {
            self.state = next;
            true
        } else {
            false
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Entries left behind by an exit that never got removed, or with no name.
    pub fn is_stale(&self) -> bool {
        self.state == BotState::Exited || !self.config.has_name()
    }

    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }

    pub fn summary(&self) -> BotSummary {
        BotSummary {
            id: self.id.clone(),
            name: self.name().to_string(),
            state: self.state,
            commands: self.config.commands.len(),
            start_time: self.started_at,
            uptime_seconds: self.uptime_seconds(),
        }
    }

    pub fn status(&self, tail: usize) -> BotStatus {
        BotStatus {
            running: true,
            detail: Some(StatusDetail {
                summary: self.summary(),
                pid: self.pid,
                logs: self.logs.tail(tail),
            }),
        }
    }
}

/// One row of a listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotSummary {
    pub id: String,
    pub name: String,
    pub state: BotState,
    /// Number of commands the running configuration declares.
    pub commands: usize,
    pub start_time: DateTime<Utc>,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDetail {
    #[serde(flatten)]
    pub summary: BotSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    pub logs: Vec<LogEntry>,
}

/// Answer to a status query; `detail` is absent when nothing is registered.
#[derive(Debug, Clone, Serialize)]
pub struct BotStatus {
    pub running: bool,
    #[serde(flatten)]
    pub detail: Option<StatusDetail>,
}

impl BotStatus {
    pub fn not_running() -> Self {
        Self { running: false, detail: None }
    }
}

/// Result of a bulk stop; one failure never prevents the rest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkStopReport {
    pub stopped: Vec<String>,
    pub failed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use botweaver_common::models::Command;

    #[test]
    fn state_machine_transitions() {
        use BotState::*;
        assert!(Staging.can_become(Installing));
        assert!(Installing.can_become(Running));
        assert!(Staging.can_become(Stopping));
        assert!(Running.can_become(Exited));
        assert!(Stopping.can_become(Exited));
        assert!(!Running.can_become(Staging));
        assert!(!Exited.can_become(Running));
        assert!(!Stopping.can_become(Running));
    }

    fn helper() -> BotConfig {
        BotConfig {
            name: "Helper".into(),
            token: "abc".into(),
            commands: vec![Command { name: "ping".into(), response: "pong".into(), ..Default::default() }],
            ..Default::default()
        }
    }

    #[test]
    fn handle_keeps_a_redacted_snapshot() {
        let mut cfg = helper();
        let (handle, _rx) = BotHandle::new("helper".into(), &cfg, 10);
        cfg.name = "Renamed".into();

        assert_eq!(handle.name(), "Helper");
        assert_eq!(handle.config.token, "");
        assert_eq!(handle.config.commands[0].name, "ping");
        assert!(!handle.is_stale());

        let summary = serde_json::to_value(handle.summary()).unwrap();
        assert_eq!(summary["name"], "Helper");
        assert_eq!(summary["commands"], 1);
        assert!(!summary.to_string().contains("abc"));
    }

    #[test]
    fn nameless_handles_are_stale() {
        let (handle, _rx) = BotHandle::new("x".into(), &BotConfig { name: " ".into(), ..helper() }, 10);
        assert!(handle.is_stale());
    }

    #[test]
    fn status_json_shape() {
        let (mut handle, _rx) = BotHandle::new("helper".into(), &helper(), 10);
        handle.logs.info("ready");
        assert!(handle.transition(BotState::Installing));
        let json = serde_json::to_value(handle.status(50)).unwrap();
        assert_eq!(json["running"], true);
        assert_eq!(json["id"], "helper");
        assert_eq!(json["state"], "installing");
        assert_eq!(json["logs"][0]["message"], "ready");
        assert!(json.get("pid").is_none());

        let json = serde_json::to_value(BotStatus::not_running()).unwrap();
        assert_eq!(json, serde_json::json!({ "running": false }));
    }
}
