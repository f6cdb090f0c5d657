//! Typed intermediate representation of a bot project.
//!
//! [`BotPlan::build`] makes every decision (intents, slash declarations,
//! presence, which command types answer prefix invocations); the renderers only
//! format what the plan says.

use std::collections::HashSet;

use botweaver_common::models::{
    ActivityType, BotConfig, CommandType, ParameterType, PresenceStatus,
};

use crate::error::GenerateError;
use crate::intents::GatewayIntents;

/// Platform limit for command and option descriptions.
pub const MAX_DESCRIPTION_CHARS: usize = 100;

/// Fallback slash description when a command has neither description nor response.
pub const DEFAULT_COMMAND_DESCRIPTION: &str = "Bot command";

/// Slash option kind; one builder method per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Integer,
    User,
    Channel,
    Role,
    Boolean,
}

impl From<ParameterType> for OptionKind {
    fn from(t: ParameterType) -> Self {
        match t {
            ParameterType::String => Self::String,
            ParameterType::Integer => Self::Integer,
            ParameterType::User => Self::User,
            ParameterType::Channel => Self::Channel,
            ParameterType::Role => Self::Role,
            ParameterType::Boolean => Self::Boolean,
        }
    }
}

impl OptionKind {
    /// `SlashCommandBuilder` method that adds an option of this kind.
    pub fn builder_method(self) -> &'static str {
        match self {
            Self::String => "addStringOption",
            Self::Integer => "addIntegerOption",
            Self::User => "addUserOption",
            Self::Channel => "addChannelOption",
            Self::Role => "addRoleOption",
            Self::Boolean => "addBooleanOption",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    pub kind: OptionKind,
    pub name: String,
    pub description: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashCommandDecl {
    pub name: String,
    pub description: String,
    pub options: Vec<OptionDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityPlan {
    pub kind: ActivityType,
    pub text: String,
    /// Present only for streaming activities with a URL.
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresencePlan {
    pub status: PresenceStatus,
    pub activity: Option<ActivityPlan>,
}

/// Everything the renderers need, decided once.
#[derive(Debug, Clone)]
pub struct BotPlan {
    pub slug: String,
    pub intents: GatewayIntents,
    pub slash_commands: Vec<SlashCommandDecl>,
    pub presence: PresencePlan,
    /// Types that produce a real reply on the prefix path.
    pub prefix_reply_types: Vec<CommandType>,
    /// The configuration embedded in the entrypoint, credential removed.
    pub embedded: BotConfig,
}

impl BotPlan {
    pub fn build(config: &BotConfig) -> Result<Self, GenerateError> {
        if !config.has_name() {
            return Err(GenerateError::MissingName);
        }

        // Names are matched trimmed everywhere: validation, slash declarations
        // and the runtime lookup in the embedded config.
        let mut embedded = config.redacted();
        for cmd in &mut embedded.commands {
            cmd.name = cmd.name.trim().to_string();
        }

        {
            let mut seen = HashSet::new();
            for cmd in &embedded.commands {
                if !seen.insert(cmd.name.as_str()) {
                    return Err(GenerateError::DuplicateCommand(cmd.name.clone()));
                }
            }
        }

        let slash_commands = if config.use_slash_commands {
            embedded.commands.iter().map(slash_decl).collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            slug: config.slug(),
            intents: GatewayIntents::required_for(config),
            slash_commands,
            presence: presence_plan(config),
            prefix_reply_types: [
                CommandType::Text,
                CommandType::Embed,
                CommandType::Reaction,
                CommandType::Role,
                CommandType::Button,
                CommandType::Modal,
                CommandType::Other,
            ]
            .into_iter()
            .filter(|t| t.works_with_prefix())
            .collect(),
            embedded,
        })
    }
}

fn slash_decl(cmd: &botweaver_common::models::Command) -> SlashCommandDecl {
    let description = [cmd.description.trim(), cmd.response.trim()]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_COMMAND_DESCRIPTION);

    SlashCommandDecl {
        name: cmd.name.clone(),
        description: truncate_chars(description, MAX_DESCRIPTION_CHARS),
        options: cmd
            .parameters
            .iter()
            .map(|p| OptionDecl {
                kind: p.param_type.into(),
                name: p.name.clone(),
                description: truncate_chars(
                    if p.description.trim().is_empty() { &p.name } else { p.description.trim() },
                    MAX_DESCRIPTION_CHARS,
                ),
                required: p.required,
            })
            .collect(),
    }
}

fn presence_plan(config: &BotConfig) -> PresencePlan {
    let activity = &config.activity;
    let activity = (!activity.name.trim().is_empty()).then(|| ActivityPlan {
        kind: activity.activity_type,
        text: activity.name.clone(),
        url: (activity.activity_type == ActivityType::Streaming && !activity.url.trim().is_empty())
            .then(|| activity.url.trim().to_string()),
    });
    PresencePlan { status: config.status, activity }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
