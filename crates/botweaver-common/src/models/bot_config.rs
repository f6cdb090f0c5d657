//! Bot configuration model: the full declarative description of one bot.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use validator::Validate;

use super::command::{split_list, Command, CommandType};
use super::lenient;
use crate::error::BotWeaverError;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Default command prefix for message-style invocation.
pub const DEFAULT_PREFIX: &str = "!";

/// Online presence shown by the bot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    #[default]
    Online,
    Idle,
    Dnd,
    Invisible,
}

impl PresenceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Idle => "idle",
            Self::Dnd => "dnd",
            Self::Invisible => "invisible",
        }
    }
}

/// Activity verb displayed next to the bot's name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityType {
    #[default]
    Playing,
    #[serde(alias = "streaming")]
    Streaming,
    #[serde(alias = "listening")]
    Listening,
    #[serde(alias = "watching")]
    Watching,
    #[serde(alias = "competing")]
    Competing,
}

impl ActivityType {
    /// Key into discord.js `ActivityType`.
    pub fn enum_name(self) -> &'static str {
        match self {
            Self::Playing => "Playing",
            Self::Streaming => "Streaming",
            Self::Listening => "Listening",
            Self::Watching => "Watching",
            Self::Competing => "Competing",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Activity {
    #[serde(rename = "type", deserialize_with = "lenient::or_default")]
    pub activity_type: ActivityType,

    /// Display text; no activity is set when empty.
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,

    /// Only used for [`ActivityType::Streaming`].
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
}

/// The complete configuration of one bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct BotConfig {
    // === Identity ===
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,

    // === Credential ===
    #[serde(deserialize_with = "lenient::string")]
    pub token: String,

    // === Runtime behavior ===
    #[serde(deserialize_with = "lenient::string")]
    pub prefix: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub status: PresenceStatus,
    #[serde(deserialize_with = "lenient::or_default")]
    pub activity: Activity,
    #[serde(deserialize_with = "lenient::not_false")]
    pub use_slash_commands: bool,

    // === Access control ===
    /// Comma-separated role ids or names; empty means unrestricted.
    #[serde(deserialize_with = "lenient::string")]
    pub allowed_roles: String,
    /// Comma-separated channel ids; empty means unrestricted.
    #[serde(deserialize_with = "lenient::string")]
    pub allowed_channels: String,
    #[serde(deserialize_with = "lenient::truthy")]
    pub dm_commands: bool,
    #[serde(deserialize_with = "lenient::not_false")]
    pub log_commands: bool,

    // === Operational ===
    #[serde(deserialize_with = "lenient::string")]
    pub error_channel_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub owner_id: String,
    #[serde(deserialize_with = "lenient::not_false")]
    pub auto_reconnect: bool,
    #[serde(deserialize_with = "lenient::truthy")]
    pub delete_commands: bool,

    // === Commands ===
    #[serde(deserialize_with = "lenient::seq")]
    #[validate(nested)]
    pub commands: Vec<Command>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            token: String::new(),
            prefix: DEFAULT_PREFIX.to_string(),
            status: PresenceStatus::Online,
            activity: Activity::default(),
            use_slash_commands: lenient::default_true(),
            allowed_roles: String::new(),
            allowed_channels: String::new(),
            dm_commands: false,
            log_commands: true,
            error_channel_id: String::new(),
            owner_id: String::new(),
            auto_reconnect: true,
            delete_commands: false,
            commands: Vec::new(),
        }
    }
}

impl BotConfig {
    /// Build a configuration from untrusted JSON, applying every default and
    /// coercion in one place.
    pub fn from_json(value: Value) -> Result<Self, BotWeaverError> {
        if !value.is_object() {
            return Err(BotWeaverError::bad_request("Bot configuration must be a JSON object"));
        }
        let mut cfg: BotConfig = serde_json::from_value(value)
            .map_err(|e| BotWeaverError::bad_request(format!("Invalid bot configuration: {e}")))?;
        if cfg.prefix.is_empty() {
            cfg.prefix = DEFAULT_PREFIX.to_string();
        }
        Ok(cfg)
    }

    /// Package / process identifier: lowercase name, whitespace runs become `-`.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// Copy safe to share or embed: the credential is blanked.
    pub fn redacted(&self) -> Self {
        Self { token: String::new(), ..self.clone() }
    }

    pub fn allowed_role_list(&self) -> Vec<String> {
        split_list(&self.allowed_roles)
    }

    pub fn allowed_channel_list(&self) -> Vec<String> {
        split_list(&self.allowed_channels)
    }

    pub fn uses_command_type(&self, ty: CommandType) -> bool {
        self.commands.iter().any(|c| c.command_type == ty)
    }
}

/// Slug used for packages, containers and running-bot ids.
pub fn slugify(name: &str) -> String {
    WHITESPACE_RUN.replace_all(&name.to_lowercase(), "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn slug_collapses_whitespace() {
        assert_eq!(slugify("My  Cool\tBot"), "my-cool-bot");
        assert_eq!(slugify("Helper"), "helper");
    }

    #[test]
    fn from_json_applies_defaults() {
        let cfg = BotConfig::from_json(json!({ "name": "Helper" })).unwrap();
        assert_eq!(cfg.prefix, "!");
        assert!(cfg.use_slash_commands);
        assert!(cfg.log_commands);
        assert!(cfg.auto_reconnect);
        assert!(!cfg.dm_commands);
        assert!(!cfg.delete_commands);
        assert_eq!(cfg.status, PresenceStatus::Online);
        assert!(cfg.commands.is_empty());
    }

    #[test]
    fn from_json_rejects_non_objects() {
        assert!(BotConfig::from_json(json!("Helper")).is_err());
        assert!(BotConfig::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn flags_follow_js_semantics() {
        let cfg = BotConfig::from_json(json!({
            "name": "x",
            "useSlashCommands": null,
            "logCommands": false,
            "dmCommands": "yes",
            "prefix": "",
            "status": "away",
            "activity": { "type": "watching", "name": "you" }
        }))
        .unwrap();
        assert!(cfg.use_slash_commands);
        assert!(!cfg.log_commands);
        assert!(cfg.dm_commands);
        assert_eq!(cfg.prefix, "!");
        assert_eq!(cfg.status, PresenceStatus::Online);
        assert_eq!(cfg.activity.activity_type, ActivityType::Watching);
    }

    #[test]
    fn unknown_presence_values_fall_back() {
        let cfg = BotConfig::from_json(json!({
            "status": "away",
            "activity": { "type": "dancing", "name": "x" }
        }))
        .unwrap();
        assert_eq!(cfg.status, PresenceStatus::Online);
        assert_eq!(cfg.activity.activity_type, ActivityType::Playing);

        let cfg = BotConfig::from_json(json!({
            "status": "dnd",
            "activity": { "type": "streaming" }
        }))
        .unwrap();
        assert_eq!(cfg.status, PresenceStatus::Dnd);
        assert_eq!(cfg.activity.activity_type, ActivityType::Streaming);
    }

    #[test]
    fn redacted_blanks_only_the_token() {
        let cfg = BotConfig {
            name: "Helper".into(),
            token: "abc".into(),
            ..Default::default()
        };
        let shared = cfg.redacted();
        assert_eq!(shared.token, "");
        assert_eq!(shared.name, "Helper");
    }

    #[test]
    fn allowed_lists_are_split() {
        let cfg = BotConfig {
            allowed_channels: "1, 2,,3".into(),
            ..Default::default()
        };
        assert_eq!(cfg.allowed_channel_list(), vec!["1", "2", "3"]);
        assert!(cfg.allowed_role_list().is_empty());
    }
}
