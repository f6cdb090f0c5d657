//! `index.js`: the generated bot itself.
//!
//! The runtime is data-driven: dispatch reads the embedded `BOT_CONFIG`, so
//! user text only ever appears inside JSON literals. The fixed parts of the
//! program live in the constants below; the rendered parts (intents, presence,
//! slash declarations, reconnect policy) come from the [`BotPlan`].

use botweaver_common::models::Permission;

use crate::error::GenerateError;
use crate::js::{indent_tail, json_expr, str_lit};
use crate::plan::{BotPlan, PresencePlan, SlashCommandDecl};
use crate::intents::GatewayIntents;

/// Embed color used when a command leaves `embedColor` empty.
pub const DEFAULT_EMBED_COLOR: &str = "#5865F2";

/// Platform limit on components in one action row.
pub const MAX_BUTTONS_PER_ROW: usize = 5;

const IMPORTS: &str = r#"import {
  ActionRowBuilder,
  ActivityType,
  ButtonBuilder,
  ButtonStyle,
  Client,
  EmbedBuilder,
  Events,
  GatewayIntentBits,
  Partials,
  PermissionFlagsBits,
  REST,
  Routes,
  SlashCommandBuilder,
} from 'discord.js';
import dotenv from 'dotenv';

dotenv.config();
"#;

/// Pure policy functions. They touch nothing but their arguments, so they can
/// be exercised outside a Discord client.
pub const POLICY_HELPERS: &str = r#"function parseList(raw) {
  return String(raw ?? '')
    .split(',')
    .map((entry) => entry.trim())
    .filter((entry) => entry.length > 0);
}

function hasPermission(member, required, allowedRoles, flags) {
  if (!required || required.length === 0) return true;
  if (!member) return false;

  if (
    allowedRoles.length > 0 &&
    member.roles.cache.some((role) => allowedRoles.includes(role.id) || allowedRoles.includes(role.name))
  ) {
    return true;
  }

  return required.every((name) => flags[name] !== undefined && member.permissions.has(flags[name]));
}

// Returns the whole seconds left, or 0 after opening a new window.
function checkCooldown(store, userId, commandName, seconds, now = Date.now()) {
  if (!(seconds > 0)) return 0;

  const key = `${userId}:${commandName}`;
  const until = store.get(key);
  if (until !== undefined && now < until) {
    return Math.ceil((until - now) / 1000);
  }

  store.set(key, now + seconds * 1000);
  return 0;
}

async function applyRoleAction(member, role, action) {
  const held = member.roles.cache.has(role.id);
  if (action === 'remove' || (action === 'toggle' && held)) {
    await member.roles.remove(role);
    return 'removed';
  }
  await member.roles.add(role);
  return 'added';
}

function buttonCustomId(commandName, index) {
  return `btn:${commandName}:${index}`;
}

function parseButtonCustomId(customId) {
  if (typeof customId !== 'string' || !customId.startsWith('btn:')) return null;

  const rest = customId.slice('btn:'.length);
  const split = rest.lastIndexOf(':');
  if (split <= 0) return null;

  const index = Number.parseInt(rest.slice(split + 1), 10);
  if (!Number.isInteger(index) || index < 0) return null;

  return { commandName: rest.slice(0, split), index };
}
"#;

const REGISTRATION: &str = r#"async function registerCommands() {
  if (!BOT_CONFIG.useSlashCommands) {
    console.log('Slash commands disabled, skipping registration.');
    return;
  }

  try {
    const rest = new REST({ version: '10' }).setToken(process.env.DISCORD_TOKEN);
    await rest.put(Routes.applicationCommands(client.user.id), { body: commands });
    console.log(`Registered ${commands.length} application (/) commands.`);
  } catch (error) {
    console.error('Error registering commands:', error);
  }
}
"#;

/// Command dispatch for both invocation paths.
///
/// Everything it touches comes in through `createDispatcher`, so the same
/// code runs against discord.js in the bot and against stubs in tests.
pub const DISPATCHER: &str = r#"function createDispatcher({
  config,
  client,
  builders,
  permissionFlags,
  prefixReplyTypes,
  cooldowns = new Map(),
  log = console,
}) {
  const allowedRoles = parseList(config.allowedRoles);
  const allowedChannels = parseList(config.allowedChannels);
  const prefix = config.prefix || '!';

  function findCommand(name) {
    return config.commands.find((command) => command.name === name);
  }

  function permitted(member, command) {
    return hasPermission(member, command.permissions, allowedRoles, permissionFlags);
  }

  function channelAllowed(channelId) {
    return allowedChannels.length === 0 || allowedChannels.includes(channelId);
  }

  async function reportError(commandName, error) {
    if (!config.errorChannelId) return;

    try {
      const channel = await client.channels.fetch(config.errorChannelId);
      if (channel?.isTextBased()) {
        await channel.send(`❌ **Error:** ${commandName} command\n\`\`\`\n${error?.stack ?? error}\n\`\`\``);
      }
    } catch (reportFailure) {
      log.error('Error sending error report:', reportFailure);
    }
  }

  function logUsage(command, user, guild) {
    if (config.logCommands) {
      log.log(`Command used: ${command.name} by ${user.tag} in ${guild?.name ?? 'DM'}`);
    }
  }

  function buildEmbed(command) {
    const embed = new builders.Embed().setColor(command.embedColor || DEFAULT_EMBED_COLOR);
    if (command.embedTitle) embed.setTitle(command.embedTitle);
    if (command.embedDescription) embed.setDescription(command.embedDescription);

    const fields = (command.embedFields ?? [])
      .filter((field) => field.name && field.value)
      .map((field) => ({ name: field.name, value: field.value, inline: Boolean(field.inline) }));
    if (fields.length > 0) embed.addFields(fields);
    return embed;
  }

  function buildButtonRow(command) {
    const labels = parseList(command.buttonLabels);
    return new builders.Row().addComponents(
      (labels.length > 0 ? labels : [DEFAULT_BUTTON_LABEL])
        .slice(0, MAX_BUTTONS_PER_ROW)
        .map((label, index) =>
          new builders.Button()
            .setCustomId(buttonCustomId(command.name, index))
            .setLabel(label)
            .setStyle(builders.primaryStyle),
        ),
    );
  }

  async function executeCommand(interaction, command) {
    const ephemeral = Boolean(command.ephemeral);

    try {
      if (!permitted(interaction.member, command)) {
        await interaction.reply({ content: MESSAGES.noPermission, ephemeral: true });
        return;
      }

      const remaining = checkCooldown(cooldowns, interaction.user.id, command.name, command.cooldown);
      if (remaining > 0) {
        await interaction.reply({ content: MESSAGES.cooldown(remaining), ephemeral: true });
        return;
      }

      switch (command.type) {
        case 'text':
          await interaction.reply({ content: command.response || 'No response', ephemeral });
          break;

        case 'embed':
          await interaction.reply({ embeds: [buildEmbed(command)], ephemeral });
          break;

        case 'reaction': {
          const message = await interaction.reply({
            content: command.response || 'Reaction message',
            ephemeral,
            fetchReply: true,
          });
          for (const emoji of parseList(command.reactions)) {
            try {
              await message.react(emoji);
            } catch (error) {
              log.error(`Failed to add reaction ${emoji}:`, error);
            }
          }
          break;
        }

        case 'role': {
          if (!interaction.inGuild()) {
            await interaction.reply({ content: MESSAGES.guildOnly, ephemeral: true });
            return;
          }

          const targetUser = interaction.options.getUser('user') ?? interaction.user;
          const member = await interaction.guild.members.fetch(targetUser.id);
          const role = interaction.guild.roles.cache.find(
            (candidate) => candidate.id === command.roleTarget || candidate.name === command.roleTarget,
          );
          if (!role) {
            await interaction.reply({ content: `❌ Role "${command.roleTarget}" not found!`, ephemeral: true });
            return;
          }

          try {
            await applyRoleAction(member, role, command.roleAction);
          } catch (error) {
            log.error(`Role ${command.roleAction} failed:`, error);
            await interaction.reply({ content: MESSAGES.roleFailed, ephemeral: true });
            break;
          }

          await interaction.reply({
            content: command.roleSuccessMessage || '✅ Role operation successful!',
            ephemeral,
          });
          break;
        }

        case 'button':
          await interaction.reply({
            content: command.response || 'Choose an option:',
            components: [buildButtonRow(command)],
            ephemeral,
          });
          break;

        default:
          await interaction.reply({ content: command.response || DEFAULT_RESPONSE, ephemeral });
      }

      logUsage(command, interaction.user, interaction.guild);
    } catch (error) {
      log.error(`Error executing command ${command.name}:`, error);

      const failure = { content: MESSAGES.failed, ephemeral: true };
      try {
        if (interaction.replied || interaction.deferred) {
          await interaction.followUp(failure);
        } else {
          await interaction.reply(failure);
        }
      } catch (replyError) {
        log.error('Error sending error message:', replyError);
      }

      await reportError(command.name, error);
    }
  }

  async function handleButton(interaction) {
    const pressed = parseButtonCustomId(interaction.customId);
    if (!pressed) return;

    const command = findCommand(pressed.commandName);
    if (!command) return;

    const label = parseList(command.buttonLabels)[pressed.index] ?? DEFAULT_BUTTON_LABEL;
    try {
      await interaction.reply({ content: `✅ You selected "${label}"!`, ephemeral: true });
    } catch (error) {
      log.error('Error answering button press:', error);
    }
  }

  async function handleInteraction(interaction) {
    if (!config.useSlashCommands) return;
    if (!interaction.isChatInputCommand() && !interaction.isButton()) return;
    if (!channelAllowed(interaction.channelId)) return;

    if (interaction.isButton()) {
      await handleButton(interaction);
      return;
    }

    const command = findCommand(interaction.commandName);
    if (command) {
      await executeCommand(interaction, command);
    }
  }

  async function handleMessage(message) {
    if (message.author.bot) return;
    if (!message.inGuild() && !config.dmCommands) return;
    if (!channelAllowed(message.channelId)) return;
    if (!message.content.startsWith(prefix)) return;

    const args = message.content.slice(prefix.length).trim().split(/\s+/);
    const command = findCommand((args.shift() ?? '').toLowerCase());
    if (!command) return;

    try {
      if (!permitted(message.member, command)) {
        await message.reply(MESSAGES.noPermission);
        return;
      }

      const remaining = checkCooldown(cooldowns, message.author.id, command.name, command.cooldown);
      if (remaining > 0) {
        await message.reply(MESSAGES.cooldown(remaining));
        return;
      }

      if (prefixReplyTypes.has(command.type)) {
        await message.reply(command.response || DEFAULT_RESPONSE);
      } else {
        await message.reply(MESSAGES.slashOnly);
      }
      logUsage(command, message.author, message.guild);

      if (config.deleteCommands && message.inGuild()) {
        await message.delete().catch(() => {});
      }
    } catch (error) {
      log.error('Error executing prefix command:', error);
      await message.reply(MESSAGES.failed).catch(() => {});
      await reportError(command.name, error);
    }
  }

  return { findCommand, executeCommand, handleButton, handleInteraction, handleMessage };
}
"#;

const WIRING: &str = r#"const dispatcher = createDispatcher({
  config: BOT_CONFIG,
  client,
  builders: {
    Embed: EmbedBuilder,
    Button: ButtonBuilder,
    Row: ActionRowBuilder,
    primaryStyle: ButtonStyle.Primary,
  },
  permissionFlags: PERMISSION_FLAGS,
  prefixReplyTypes: PREFIX_REPLY_TYPES,
});
"#;

const EVENTS: &str = r#"client.once(Events.ClientReady, async (readyClient) => {
  console.log(`✅ ${readyClient.user.tag} is online!`);
  console.log(`Bot name: ${BOT_CONFIG.name}`);
  console.log(`Servers: ${readyClient.guilds.cache.size}`);

  readyClient.user.setPresence(PRESENCE);
  await registerCommands();
});

client.on(Events.InteractionCreate, (interaction) => dispatcher.handleInteraction(interaction));

client.on(Events.MessageCreate, (message) => dispatcher.handleMessage(message));
"#;

const RECONNECT_DISABLED: &str = r#"// autoReconnect is off: a lost gateway connection ends the process.
for (const event of [Events.ShardDisconnect, Events.ShardReconnecting]) {
  client.on(event, (_detail, shardId) => {
    console.error(`Shard ${shardId} lost its connection and auto-reconnect is disabled; exiting.`);
    shutdown(1);
  });
}
"#;

const LIFECYCLE: &str = r#"client.on(Events.Error, (error) => {
  console.error('Client error:', error);
});

process.on('unhandledRejection', (error) => {
  console.error('Unhandled promise rejection:', error);
});

let shuttingDown = false;

async function shutdown(code = 0) {
  if (shuttingDown) return;
  shuttingDown = true;
  console.log('Shutting down gracefully...');
  try {
    await client.destroy();
  } finally {
    process.exit(code);
  }
}

process.on('SIGINT', () => shutdown(0));
process.on('SIGTERM', () => shutdown(0));

client.login(process.env.DISCORD_TOKEN).catch((error) => {
  console.error('Failed to log in:', error?.message ?? error);
  process.exit(1);
});
"#;

/// User-facing replies shared by both invocation paths.
pub const MESSAGES: &str = r#"const MESSAGES = {
  noPermission: '❌ You do not have sufficient permissions to use this command!',
  cooldown: (seconds) => `⏱️ Please wait ${seconds} seconds before using this command again.`,
  guildOnly: '❌ This command can only be used in a server.',
  roleFailed: '❌ Role operation failed! Check bot permissions.',
  slashOnly: 'This command can only be used as a slash command (/).',
  failed: 'An error occurred while executing the command!',
};
"#;

/// Render the entrypoint for `plan`.
pub fn render(plan: &BotPlan) -> Result<String, GenerateError> {
    let mut out = String::with_capacity(16 * 1024);

    out.push_str("// Generated by BotWeaver. Runtime settings live in BOT_CONFIG.\n");
    out.push_str(IMPORTS);
    out.push('\n');
    out.push_str(&client_options(plan.intents, plan.embedded.dm_commands));
    out.push('\n');
    out.push_str(&format!("const BOT_CONFIG = {};\n\n", json_expr(&plan.embedded)?));
    out.push_str(&constants(plan));
    out.push('\n');
    out.push_str(MESSAGES);
    out.push('\n');
    out.push_str(&runtime_defaults());
    out.push('\n');
    out.push_str(POLICY_HELPERS);
    out.push('\n');
    out.push_str(&slash_commands(&plan.slash_commands));
    out.push('\n');
    out.push_str(REGISTRATION);
    out.push('\n');
    out.push_str(DISPATCHER);
    out.push('\n');
    out.push_str(WIRING);
    out.push('\n');
    out.push_str(EVENTS);
    out.push('\n');
    if !plan.embedded.auto_reconnect {
        out.push_str(RECONNECT_DISABLED);
        out.push('\n');
    }
    out.push_str(LIFECYCLE);

    Ok(out)
}

fn client_options(intents: GatewayIntents, dm_commands: bool) -> String {
    let mut out = String::from("const client = new Client({\n  intents: [\n");
    for name in intents.js_names() {
        out.push_str(&format!("    GatewayIntentBits.{name},\n"));
    }
    out.push_str("  ],\n");
    // DM channels arrive uncached; without this partial prefix commands in DMs never fire.
    if dm_commands {
        out.push_str("  partials: [Partials.Channel],\n");
    }
    out.push_str("});\n");
    out
}

fn constants(plan: &BotPlan) -> String {
    let mut out = String::new();

    out.push_str("const PERMISSION_FLAGS = {\n");
    for p in Permission::ALL {
        out.push_str(&format!("  {}: PermissionFlagsBits.{},\n", p.as_str(), p.flag_name()));
    }
    out.push_str("};\n");

    out.push_str(&presence(&plan.presence));

    out.push_str(&prefix_reply_types(plan));
    out
}

/// `PREFIX_REPLY_TYPES`: command types answered with their response on the prefix path.
pub fn prefix_reply_types(plan: &BotPlan) -> String {
    let reply_types: Vec<String> = plan
        .prefix_reply_types
        .iter()
        .map(|t| str_lit(t.as_str()))
        .collect();
    format!("const PREFIX_REPLY_TYPES = new Set([{}]);\n", reply_types.join(", "))
}

/// Fallbacks the dispatcher uses when a command leaves a field empty.
pub fn runtime_defaults() -> String {
    format!(
        "const DEFAULT_EMBED_COLOR = {};\nconst DEFAULT_BUTTON_LABEL = 'Button 1';\nconst DEFAULT_RESPONSE = 'Command response';\nconst MAX_BUTTONS_PER_ROW = {MAX_BUTTONS_PER_ROW};\n",
        str_lit(DEFAULT_EMBED_COLOR)
    )
}

fn presence(plan: &PresencePlan) -> String {
    let activities = match &plan.activity {
        None => "[]".to_string(),
        Some(activity) => {
            let url = activity
                .url
                .as_deref()
                .map(|u| format!(", url: {}", str_lit(u)))
                .unwrap_or_default();
            format!(
                "[{{ name: {}, type: ActivityType.{}{url} }}]",
                str_lit(&activity.text),
                activity.kind.enum_name()
            )
        }
    };
    format!(
        "const PRESENCE = {{\n  status: {},\n  activities: {activities},\n}};\n",
        str_lit(plan.status.as_str())
    )
}

fn slash_commands(decls: &[SlashCommandDecl]) -> String {
    if decls.is_empty() {
        return "const commands = [];\n".to_string();
    }

    let mut out = String::from("const commands = [\n");
    for decl in decls {
        out.push_str("  ");
        out.push_str(&indent_tail(&slash_command(decl), 2));
        out.push_str(",\n");
    }
    out.push_str("].map((command) => command.toJSON());\n");
    out
}

fn slash_command(decl: &SlashCommandDecl) -> String {
    let mut out = format!(
        "new SlashCommandBuilder()\n  .setName({})\n  .setDescription({})",
        str_lit(&decl.name),
        str_lit(&decl.description)
    );
    for option in &decl.options {
        out.push_str(&format!(
            "\n  .{}((option) =>\n    option.setName({}).setDescription({}).setRequired({}),\n  )",
            option.kind.builder_method(),
            str_lit(&option.name),
            str_lit(&option.description),
            option.required
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use botweaver_common::models::{
        Activity, ActivityType, BotConfig, Command, CommandType, Parameter, ParameterType,
        PresenceStatus,
    };

    fn render_config(cfg: &BotConfig) -> String {
        render(&BotPlan::build(cfg).unwrap()).unwrap()
    }

    fn helper() -> BotConfig {
        BotConfig {
            name: "Helper".into(),
            token: "abc".into(),
            commands: vec![Command {
                name: "ping".into(),
                response: "pong".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn embeds_config_without_token() {
        let js = render_config(&helper());
        assert!(js.contains(r#""response": "pong""#));
        assert!(js.contains(r#""token": """#));
        assert!(!js.contains("abc"));
        assert!(js.contains("case 'text':"));
    }

    #[test]
    fn events_route_through_one_dispatcher() {
        let js = render_config(&helper());
        assert!(js.contains("function createDispatcher({"));
        assert!(js.contains("const dispatcher = createDispatcher({\n  config: BOT_CONFIG,"));
        assert!(js.contains("(interaction) => dispatcher.handleInteraction(interaction)"));
        assert!(js.contains("(message) => dispatcher.handleMessage(message)"));
        assert!(js.contains("const DEFAULT_EMBED_COLOR = \"#5865F2\";"));

        let declared = js.find("function createDispatcher").unwrap();
        let wired = js.find("const dispatcher = ").unwrap();
        let handled = js.find("Events.InteractionCreate").unwrap();
        assert!(declared < wired && wired < handled);
    }

    #[test]
    fn slash_declaration_with_options() {
        let mut cfg = helper();
        cfg.commands[0].parameters.push(Parameter {
            name: "who".into(),
            param_type: ParameterType::User,
            required: true,
            ..Default::default()
        });
        let js = render_config(&cfg);
        assert!(js.contains(
            "  new SlashCommandBuilder()\n    .setName(\"ping\")\n    .setDescription(\"pong\")\n    .addUserOption((option) =>\n      option.setName(\"who\").setDescription(\"who\").setRequired(true),\n    ),\n"
        ));
        assert!(js.contains("GatewayIntentBits.GuildMembers,"));
    }

    #[test]
    fn slash_commands_omitted_when_disabled() {
        let cfg = BotConfig { use_slash_commands: false, ..helper() };
        let js = render_config(&cfg);
        assert!(js.contains("const commands = [];\n"));
        assert!(!js.contains("new SlashCommandBuilder()"));
    }

    #[test]
    fn presence_is_rendered_from_plan() {
        let mut cfg = helper();
        cfg.status = PresenceStatus::Dnd;
        cfg.activity = Activity {
            activity_type: ActivityType::Streaming,
            name: "live".into(),
            url: "https://twitch.tv/helper".into(),
        };
        let js = render_config(&cfg);
        assert!(js.contains("  status: \"dnd\",\n"));
        assert!(js.contains(
            "activities: [{ name: \"live\", type: ActivityType.Streaming, url: \"https://twitch.tv/helper\" }],"
        ));
    }

    #[test]
    fn dm_commands_add_intent_and_partial() {
        let js = render_config(&BotConfig { dm_commands: true, ..helper() });
        assert!(js.contains("GatewayIntentBits.DirectMessages,"));
        assert!(js.contains("partials: [Partials.Channel],"));

        let js = render_config(&helper());
        assert!(!js.contains("partials:"));
    }

    #[test]
    fn reconnect_policy_only_when_disabled() {
        assert!(!render_config(&helper()).contains("Events.ShardReconnecting"));
        let js = render_config(&BotConfig { auto_reconnect: false, ..helper() });
        assert!(js.contains("Events.ShardReconnecting"));
    }

    #[test]
    fn permission_table_covers_vocabulary() {
        let js = render_config(&helper());
        assert!(js.contains("  MANAGE_GUILD: PermissionFlagsBits.ManageGuild,\n"));
        assert!(js.contains("  ADMINISTRATOR: PermissionFlagsBits.Administrator,\n"));
    }

    #[test]
    fn hostile_strings_stay_inside_literals() {
        let mut cfg = helper();
        cfg.commands[0].description = "it's `${process.exit()}` \"x\"".into();
        let js = render_config(&cfg);
        assert!(js.contains(r#".setDescription("it's `${process.exit()}` \"x\"")"#));
    }

    #[test]
    fn prefix_reply_types_listed() {
        let mut cfg = helper();
        cfg.commands[0].command_type = CommandType::Embed;
        let js = render_config(&cfg);
        assert!(js.contains(r#"const PREFIX_REPLY_TYPES = new Set(["text", "other"]);"#));
    }
}
