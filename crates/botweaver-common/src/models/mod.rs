//! Core domain models shared across all BotWeaver services.
//!
//! These are the "truth" types: what the client edits, the generator consumes
//! and the supervisor snapshots when it starts a bot.

pub mod bot_config;
pub mod command;
pub mod lenient;
pub mod transfer;

/// Re-export all model types for convenience.
pub use bot_config::*;
pub use command::*;
pub use transfer::*;
