//! Renderers: [`BotPlan`](crate::plan::BotPlan) in, file text out.
//!
//! No renderer makes a decision the plan has not already made.

pub mod container;
pub mod entrypoint;
pub mod env;
pub mod manifest;
pub mod readme;
pub mod scripts;
