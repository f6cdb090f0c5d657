//! Input validation utilities.
//!
//! Validation helpers used by the API routes.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::models::{BotConfig, CommandType};

/// Slash command and option names: lowercase, no spaces, 1-32 chars.
static SLASH_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]{1,32}$").expect("static regex"));

/// Flatten (possibly nested) validation errors into human-readable lines.
fn format_validation_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut out = Vec::new();
    collect_errors(errors, "", &mut out);
    out.sort();
    out
}

fn collect_errors(errors: &ValidationErrors, path: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let here = if path.is_empty() {
            field.to_string()
        } else {
            format!("{path}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for e in errs {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for '{here}'"));
                    out.push(format!("{}: {msg}", describe_path(&here)));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_errors(inner, &here, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_errors(inner, &format!("{here}[{index}]"), out);
                }
            }
        }
    }
}

/// `commands[0].parameters[1].description` -> `Command 1, parameter 2`.
fn describe_path(path: &str) -> String {
    let mut parts = Vec::new();
    for segment in path.split('.') {
        let Some((name, rest)) = segment.split_once('[') else {
            continue;
        };
        let Ok(index) = rest.trim_end_matches(']').parse::<usize>() else {
            continue;
        };
        let label = match name {
            "commands" => "Command",
            "parameters" => "parameter",
            "embedFields" | "embed_fields" => "embed field",
            other => other,
        };
        parts.push(format!("{label} {}", index + 1));
    }
    if parts.is_empty() {
        path.to_string()
    } else {
        parts.join(", ")
    }
}

/// Itemized result of checking a configuration before generation or hosting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Check everything a runnable bot needs.
///
/// Errors are listed in a stable order: configuration-level problems first,
/// then per-command problems in command order.
pub fn validate_bot_config(config: &BotConfig) -> ValidationReport {
    let mut errors = Vec::new();

    if !config.has_name() {
        errors.push("Bot name is required".to_string());
    }
    if !config.has_token() {
        errors.push("Bot token is required".to_string());
    }
    if config.commands.is_empty() {
        errors.push("At least one command is required".to_string());
    }

    let mut seen = HashSet::new();
    for (i, cmd) in config.commands.iter().enumerate() {
        let n = i + 1;
        let name = cmd.name.trim();
        if name.is_empty() {
            errors.push(format!("Command {n}: Name is required"));
        } else {
            if !seen.insert(name) {
                errors.push(format!("Command {n}: Duplicate command name '{name}'"));
            }
            if config.use_slash_commands && !is_slash_name(name) {
                errors.push(format!(
                    "Command {n}: Name must be 1-32 lowercase characters without spaces"
                ));
            }
        }

        if cmd.command_type == CommandType::Text && cmd.response.trim().is_empty() {
            errors.push(format!("Command {n}: Response is required"));
        }

        if config.use_slash_commands {
            for (j, param) in cmd.parameters.iter().enumerate() {
                if !is_slash_name(param.name.trim()) {
                    errors.push(format!(
                        "Command {n}, parameter {}: Name must be 1-32 lowercase characters without spaces",
                        j + 1
                    ));
                }
            }
        }
    }

    if let Err(e) = config.validate() {
        errors.extend(format_validation_errors(&e));
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

/// Whether `name` can be registered as a slash command or option.
pub fn is_slash_name(name: &str) -> bool {
    SLASH_NAME.is_match(name)
}
