//! Generation error types.

use botweaver_common::error::BotWeaverError;
use thiserror::Error;

/// Reasons a configuration cannot be turned into a project.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Bot name is required")]
    MissingName,

    #[error("Duplicate command name '{0}'")]
    DuplicateCommand(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<GenerateError> for BotWeaverError {
    fn from(e: GenerateError) -> Self {
        match e {
            GenerateError::MissingName => BotWeaverError::bad_request(e.to_string()),
            GenerateError::DuplicateCommand(_) => BotWeaverError::Validation {
                errors: vec![e.to_string()],
            },
            GenerateError::Serialize(_) => BotWeaverError::Generation {
                detail: e.to_string(),
            },
        }
    }
}
