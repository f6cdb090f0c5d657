//! Supervisor error types.

use botweaver_codegen::GenerateError;
use botweaver_common::error::BotWeaverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Bot name is required")]
    MissingName,

    #[error("Bot token is required")]
    MissingToken,

    #[error("Bot '{0}' is already running")]
    AlreadyRunning(String),

    #[error("Bot '{0}' not found or not running")]
    NotFound(String),

    #[error("failed to stage project: {0}")]
    Staging(#[source] std::io::Error),

    #[error("failed to generate project: {0}")]
    Generation(#[from] GenerateError),

    #[error("failed to spawn installer: {0}")]
    InstallSpawn(#[source] std::io::Error),

    #[error("installer exited with {}", exit_description(.code))]
    InstallFailed { code: Option<i32> },

    #[error("installer did not finish within {0} seconds")]
    InstallTimeout(u64),

    #[error("failed to spawn bot process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("start cancelled by a stop request")]
    Cancelled,
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {c}"),
        None => "a signal".to_string(),
    }
}

impl From<SupervisorError> for BotWeaverError {
    fn from(e: SupervisorError) -> Self {
        let stage = match &e {
            SupervisorError::MissingName | SupervisorError::MissingToken => {
                return BotWeaverError::bad_request(e.to_string());
            }
            SupervisorError::AlreadyRunning(id) => {
                return BotWeaverError::AlreadyRunning { id: id.clone() };
            }
            SupervisorError::NotFound(id) => {
                return BotWeaverError::not_found(format!("Bot '{id}'"));
            }
            SupervisorError::Staging(_) => "Failed to create temporary directory",
            SupervisorError::Generation(_) => "Failed to generate bot code",
            SupervisorError::InstallSpawn(_) => "Failed to start installation process",
            SupervisorError::InstallFailed { .. } => "Failed to install dependencies",
            SupervisorError::InstallTimeout(_) => "Installation timeout",
            SupervisorError::Spawn(_) => "Failed to start bot process",
            SupervisorError::Cancelled => "Bot start was cancelled",
        };
        BotWeaverError::Lifecycle { stage: stage.to_string(), detail: e.to_string() }
    }
}
