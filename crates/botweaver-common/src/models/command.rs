//! Command model: one named, typed unit of bot behavior.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::lenient;

/// How a command responds when invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    #[default]
    Text,
    Embed,
    Reaction,
    Role,
    Button,
    Modal,
    /// Anything the builder does not know; answered like `text`.
    #[serde(other)]
    Other,
}

impl CommandType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Embed => "embed",
            Self::Reaction => "reaction",
            Self::Role => "role",
            Self::Button => "button",
            Self::Modal => "modal",
            Self::Other => "other",
        }
    }

    /// Types that produce a real reply on the prefix (`!name`) path; the rest
    /// point the user at the slash command.
    pub fn works_with_prefix(self) -> bool {
        matches!(self, Self::Text | Self::Other)
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slash command option kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    #[default]
    String,
    Integer,
    User,
    Channel,
    Role,
    Boolean,
}

/// What a `role` command does to the target member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleAction {
    #[default]
    Add,
    Remove,
    Toggle,
}

impl RoleAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Toggle => "toggle",
        }
    }
}

/// Platform permissions a command may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    ManageMessages,
    ManageRoles,
    KickMembers,
    BanMembers,
    ManageChannels,
    ManageGuild,
    Administrator,
}

impl Permission {
    pub const ALL: [Permission; 7] = [
        Self::ManageMessages,
        Self::ManageRoles,
        Self::KickMembers,
        Self::BanMembers,
        Self::ManageChannels,
        Self::ManageGuild,
        Self::Administrator,
    ];

    /// Name as stored in configurations.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManageMessages => "MANAGE_MESSAGES",
            Self::ManageRoles => "MANAGE_ROLES",
            Self::KickMembers => "KICK_MEMBERS",
            Self::BanMembers => "BAN_MEMBERS",
            Self::ManageChannels => "MANAGE_CHANNELS",
            Self::ManageGuild => "MANAGE_GUILD",
            Self::Administrator => "ADMINISTRATOR",
        }
    }

    /// Key into discord.js `PermissionFlagsBits`.
    pub fn flag_name(self) -> &'static str {
        match self {
            Self::ManageMessages => "ManageMessages",
            Self::ManageRoles => "ManageRoles",
            Self::KickMembers => "KickMembers",
            Self::BanMembers => "BanMembers",
            Self::ManageChannels => "ManageChannels",
            Self::ManageGuild => "ManageGuild",
            Self::Administrator => "Administrator",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPermission(pub String);

impl fmt::Display for UnknownPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown permission '{}'", self.0)
    }
}

impl std::error::Error for UnknownPermission {}

impl FromStr for Permission {
    type Err = UnknownPermission;

    /// Accepts `MANAGE_GUILD` as well as the discord.js spelling `ManageGuild`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|p| p.flag_name().eq_ignore_ascii_case(&folded))
            .ok_or_else(|| UnknownPermission(s.to_owned()))
    }
}

/// A typed slash command option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Parameter {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,

    #[serde(deserialize_with = "lenient::string")]
    #[validate(length(max = 100, message = "Parameter description must be at most 100 characters"))]
    pub description: String,

    #[serde(rename = "type", deserialize_with = "lenient::or_default")]
    pub param_type: ParameterType,

    #[serde(deserialize_with = "lenient::truthy")]
    pub required: bool,
}

/// One name/value row of an embed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbedField {
    #[serde(deserialize_with = "lenient::string")]
    #[validate(length(max = 256, message = "Embed field name must be at most 256 characters"))]
    pub name: String,

    #[serde(deserialize_with = "lenient::string")]
    #[validate(length(max = 1024, message = "Embed field value must be at most 1024 characters"))]
    pub value: String,

    #[serde(deserialize_with = "lenient::truthy")]
    pub inline: bool,
}

impl EmbedField {
    /// Fields missing a name or value are left out of the rendered embed.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.value.is_empty()
    }
}

/// A command as edited in the builder.
///
/// The type-specific groups (`embed_*`, `role_*`, `reactions`, `button_labels`)
/// are only meaningful for their own [`CommandType`]; the generator ignores them
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Command {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,

    #[serde(deserialize_with = "lenient::string")]
    #[validate(length(max = 100, message = "Description must be at most 100 characters"))]
    pub description: String,

    #[serde(rename = "type", deserialize_with = "lenient::or_default")]
    pub command_type: CommandType,

    #[serde(deserialize_with = "lenient::string")]
    pub response: String,

    #[serde(deserialize_with = "lenient::truthy")]
    pub ephemeral: bool,

    #[serde(deserialize_with = "lenient::permissions")]
    pub permissions: Vec<Permission>,

    /// Seconds between uses per user; 0 disables.
    #[serde(deserialize_with = "lenient::seconds")]
    pub cooldown: u64,

    #[serde(deserialize_with = "lenient::seq")]
    #[validate(nested)]
    pub parameters: Vec<Parameter>,

    // embed
    #[serde(deserialize_with = "lenient::string")]
    pub embed_title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub embed_description: String,
    #[serde(deserialize_with = "lenient::string")]
    pub embed_color: String,
    #[serde(deserialize_with = "lenient::seq")]
    #[validate(nested)]
    pub embed_fields: Vec<EmbedField>,

    // role
    #[serde(deserialize_with = "lenient::or_default")]
    pub role_action: RoleAction,
    #[serde(deserialize_with = "lenient::string")]
    pub role_target: String,
    #[serde(deserialize_with = "lenient::string")]
    pub role_success_message: String,

    // reaction
    /// Comma-separated emoji.
    #[serde(deserialize_with = "lenient::string")]
    pub reactions: String,

    // button
    /// Comma-separated labels.
    #[serde(deserialize_with = "lenient::string")]
    pub button_labels: String,
}

impl Command {
    pub fn reaction_list(&self) -> Vec<String> {
        split_list(&self.reactions)
    }

    pub fn button_label_list(&self) -> Vec<String> {
        split_list(&self.button_labels)
    }

    /// Whether invoking this command needs member data from the gateway.
    pub fn needs_members(&self) -> bool {
        self.command_type == CommandType::Role
            || self.parameters.iter().any(|p| p.param_type == ParameterType::User)
    }
}

/// Split a comma-separated field, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
