//! # botweaver-common
//!
//! Shared configuration model, settings, validation and error handling used
//! across all BotWeaver crates. No I/O beyond loading settings.

pub mod config;
pub mod error;
pub mod models;
pub mod validation;
