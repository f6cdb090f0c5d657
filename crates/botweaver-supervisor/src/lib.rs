//! Hosts generated bots as child processes on this machine.
//!
//! A [`ProcessSupervisor`] owns the registry of hosted bots. Each start stages a
//! freshly generated project, installs its dependencies, and spawns the entrypoint
//! with the credential passed only through the child's environment. An exit
//! handler per process keeps the registry in step with reality and removes the
//! staging directory afterwards.

pub mod config;
pub mod error;
pub mod handle;
pub mod logs;
mod process;
mod staging;
pub mod supervisor;

pub use config::SupervisorConfig;
pub use error::SupervisorError;
pub use handle::{BotState, BotStatus, BotSummary, BulkStopReport, StatusDetail};
pub use logs::{LogEntry, LogKind};
pub use supervisor::ProcessSupervisor;
