//! `README.md` for the generated project.

use botweaver_common::models::{BotConfig, Command, CommandType};

use crate::plan::BotPlan;

pub fn render(plan: &BotPlan) -> String {
    let cfg = &plan.embedded;
    let about = match cfg.description.trim() {
        "" => "This bot was created with BotWeaver.",
        d => d,
    };
    let commands: Vec<String> = cfg.commands.iter().map(|c| command_entry(c, &cfg.prefix)).collect();
    let commands = if commands.is_empty() {
        "_No commands configured._".to_string()
    } else {
        commands.join("\n")
    };
    let usage = if cfg.use_slash_commands {
        format!(
            "- **Slash commands**: `/command_name` (recommended)\n- **Prefix commands**: `{}command_name`",
            cfg.prefix
        )
    } else {
        format!("- **Prefix commands**: `{}command_name`", cfg.prefix)
    };

    let prefix_types: Vec<&str> = plan.prefix_reply_types.iter().map(|t| t.as_str()).collect();
    let access = access_section(cfg);

    format!(
        r#"# {name}

{about}

## Commands

{commands}

## Usage

{usage}

Only {prefix_types} commands answer prefix invocations; other command types reply through slash commands.
{access}
## Setup

### Automatic install

Linux / macOS:

```bash
chmod +x install.sh && ./install.sh
```

Windows:

```bat
install.bat
```

### Manual install

1. Check Node.js 18 or newer is installed: `node --version`
2. Install dependencies: `npm install`
3. Put your bot token in `.env`: `DISCORD_TOKEN=your_bot_token_here`
4. Start the bot: `npm start`

### Docker

```bash
docker compose up -d      # start
docker compose down       # stop
```

## Troubleshooting

- **Bot stays offline**: check the token in `.env` and that the bot was invited to the server.
- **Slash commands missing**: registration can take a minute or two after the first start.
- **Permission errors**: the bot's role must be above any role it manages.

Keep `.env` private and out of version control.
"#,
        name = cfg.name,
        prefix_types = prefix_types.join(" and "),
    )
}

fn access_section(cfg: &BotConfig) -> String {
    let roles = cfg.allowed_role_list();
    let channels = cfg.allowed_channel_list();
    if roles.is_empty() && channels.is_empty() {
        return String::new();
    }

    let mut out = String::from("\n## Access\n\n");
    if !roles.is_empty() {
        out.push_str(&format!("- Roles that skip permission checks: {}\n", roles.join(", ")));
    }
    if !channels.is_empty() {
        out.push_str(&format!("- Commands are only answered in channels: {}\n", channels.join(", ")));
    }
    out
}

fn command_entry(cmd: &Command, prefix: &str) -> String {
    let summary = match cmd.description.trim() {
        "" => "Bot command",
        d => d,
    };
    let mut entry = format!("- **{}** (`{prefix}{}`): {summary}", cmd.name, cmd.name);
    if cmd.command_type != CommandType::Text {
        entry.push_str(&format!(" *({})*", cmd.command_type));
    }
    if !cmd.parameters.is_empty() {
        let params: Vec<String> = cmd
            .parameters
            .iter()
            .map(|p| if p.required { format!("{}*", p.name) } else { p.name.clone() })
            .collect();
        entry.push_str(&format!("\n  - Parameters: {}", params.join(", ")));
    }
    if !cmd.permissions.is_empty() {
        let perms: Vec<&str> = cmd.permissions.iter().map(|p| p.as_str()).collect();
        entry.push_str(&format!("\n  - Required permissions: {}", perms.join(", ")));
    }
    match cmd.command_type {
        CommandType::Reaction => {
            let reactions = cmd.reaction_list();
            if !reactions.is_empty() {
                entry.push_str(&format!("\n  - Reactions: {}", reactions.join(" ")));
            }
        }
        CommandType::Button => {
            let labels = cmd.button_label_list();
            if !labels.is_empty() {
                entry.push_str(&format!("\n  - Buttons: {}", labels.join(", ")));
            }
        }
        CommandType::Embed => {
            let fields = cmd.embed_fields.iter().filter(|f| f.is_complete()).count();
            if fields > 0 {
                entry.push_str(&format!("\n  - Embed fields: {fields}"));
            }
        }
        _ => {}
    }
    if cmd.cooldown > 0 {
        entry.push_str(&format!("\n  - Cooldown: {} seconds", cmd.cooldown));
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use botweaver_common::models::{EmbedField, Parameter, Permission};

    #[test]
    fn lists_command_details() {
        let cfg = BotConfig {
            name: "Helper".into(),
            commands: vec![Command {
                name: "kick".into(),
                description: "Kick someone".into(),
                command_type: CommandType::Role,
                permissions: vec![Permission::KickMembers],
                cooldown: 30,
                parameters: vec![Parameter { name: "user".into(), required: true, ..Default::default() }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let readme = render(&BotPlan::build(&cfg).unwrap());
        assert!(readme.starts_with("# Helper\n"));
        assert!(readme.contains("- **kick** (`!kick`): Kick someone *(role)*"));
        assert!(readme.contains("  - Parameters: user*"));
        assert!(readme.contains("  - Required permissions: KICK_MEMBERS"));
        assert!(readme.contains("  - Cooldown: 30 seconds"));
        assert!(readme.contains("docker compose up -d"));
        assert!(readme.contains("Only text and other commands answer prefix invocations"));
        assert!(!readme.contains("## Access"));
    }

    #[test]
    fn lists_type_specific_details_and_access() {
        let cfg = BotConfig {
            name: "Helper".into(),
            allowed_roles: "Mods, ".into(),
            allowed_channels: "123,456".into(),
            commands: vec![
                Command {
                    name: "vote".into(),
                    command_type: CommandType::Reaction,
                    reactions: "👍, 👎".into(),
                    ..Default::default()
                },
                Command {
                    name: "pick".into(),
                    command_type: CommandType::Button,
                    button_labels: "Yes,No".into(),
                    ..Default::default()
                },
                Command {
                    name: "info".into(),
                    command_type: CommandType::Embed,
                    embed_fields: vec![
                        EmbedField { name: "a".into(), value: "b".into(), inline: false },
                        EmbedField { name: "".into(), value: "dropped".into(), inline: false },
                    ],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let readme = render(&BotPlan::build(&cfg).unwrap());
        assert!(readme.contains("  - Reactions: 👍 👎"));
        assert!(readme.contains("  - Buttons: Yes, No"));
        assert!(readme.contains("  - Embed fields: 1"));
        assert!(readme.contains("## Access"));
        assert!(readme.contains("- Roles that skip permission checks: Mods\n"));
        assert!(readme.contains("- Commands are only answered in channels: 123, 456\n"));
    }
}
