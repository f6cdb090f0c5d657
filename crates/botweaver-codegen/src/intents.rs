//! Gateway intents: the capabilities a generated bot requests at connect time.
//!
//! Intents are derived from the command list every time a project is generated,
//! never stored, so a configuration can't drift out of sync with what it asks for.

use bitflags::bitflags;
use botweaver_common::models::{BotConfig, CommandType};

bitflags! {
    /// Discord gateway intents (bit values match the platform's).
    ///
    /// Declaration order is the order intents are written into the client options.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GatewayIntents: u32 {
        /// Guild create/update, channels, roles
        const GUILDS                  = 1 << 0;
        /// Messages in guild channels
        const GUILD_MESSAGES          = 1 << 9;
        /// Message text (privileged)
        const MESSAGE_CONTENT         = 1 << 15;
        /// Member fetches (privileged); role commands and user parameters
        const GUILD_MEMBERS           = 1 << 1;
        /// Reaction events on guild messages
        const GUILD_MESSAGE_REACTIONS = 1 << 10;
        /// Messages in DMs, for prefix commands outside guilds
        const DIRECT_MESSAGES         = 1 << 12;
    }
}

/// discord.js `GatewayIntentBits` member for each flag.
const JS_NAMES: [(GatewayIntents, &str); 6] = [
    (GatewayIntents::GUILDS, "Guilds"),
    (GatewayIntents::GUILD_MESSAGES, "GuildMessages"),
    (GatewayIntents::MESSAGE_CONTENT, "MessageContent"),
    (GatewayIntents::GUILD_MEMBERS, "GuildMembers"),
    (GatewayIntents::GUILD_MESSAGE_REACTIONS, "GuildMessageReactions"),
    (GatewayIntents::DIRECT_MESSAGES, "DirectMessages"),
];

impl GatewayIntents {
    /// Every bot reads guild messages.
    pub fn base() -> Self {
        Self::GUILDS | Self::GUILD_MESSAGES | Self::MESSAGE_CONTENT
    }

    /// Minimal set for `config`.
    pub fn required_for(config: &BotConfig) -> Self {
        let mut intents = Self::base();
        if config.commands.iter().any(|c| c.needs_members()) {
            intents |= Self::GUILD_MEMBERS;
        }
        if config.uses_command_type(CommandType::Reaction) {
            intents |= Self::GUILD_MESSAGE_REACTIONS;
        }
        if config.dm_commands {
            intents |= Self::DIRECT_MESSAGES;
        }
        intents
    }

    /// `GatewayIntentBits.*` expressions in declaration order.
    pub fn js_names(self) -> Vec<&'static str> {
        JS_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}
