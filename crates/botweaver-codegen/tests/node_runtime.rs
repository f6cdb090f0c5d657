//! Runs the generated runtime under Node.js: the policy helpers on their own,
//! and the dispatcher wired to stub Discord objects.
//!
//! Skipped (with a note on stderr) when `node` is not on PATH.

use std::process::Command;

use botweaver_codegen::BotPlan;
use botweaver_codegen::js::json_expr;
use botweaver_codegen::render::entrypoint::{
    DISPATCHER, MESSAGES, POLICY_HELPERS, prefix_reply_types, runtime_defaults,
};
use botweaver_common::models::BotConfig;
use serde_json::{Value, json};

const SCENARIO: &str = r#"
const results = {};

// cooldowns
const store = new Map();
const t = 1_000_000;
results.first = checkCooldown(store, 'u1', 'ping', 10, t);
results.during = checkCooldown(store, 'u1', 'ping', 10, t + 5_000);
results.nearEnd = checkCooldown(store, 'u1', 'ping', 10, t + 9_500);
results.after = checkCooldown(store, 'u1', 'ping', 10, t + 11_000);
results.reset = checkCooldown(store, 'u1', 'ping', 10, t + 12_000);
results.otherUser = checkCooldown(store, 'u2', 'ping', 10, t + 5_000);
results.disabled = checkCooldown(store, 'u1', 'other', 0, t);

// members
function member(roleIds, perms) {
  const roles = new Map(roleIds.map((id) => [id, { id, name: `role-${id}` }]));
  return {
    roles: {
      cache: {
        some: (pred) => [...roles.values()].some(pred),
        has: (id) => roles.has(id),
      },
      add: async (role) => { roles.set(role.id, role); },
      remove: async (role) => { roles.delete(role.id); },
    },
    permissions: { has: (flag) => perms.includes(flag) },
  };
}
const flags = { KICK_MEMBERS: 2n, ADMINISTRATOR: 8n };
results.allowedRoleId = hasPermission(member(['42'], []), ['KICK_MEMBERS'], ['42'], flags);
results.allowedRoleName = hasPermission(member(['7'], []), ['KICK_MEMBERS'], ['role-7'], flags);
results.permissionBits = hasPermission(member([], [2n]), ['KICK_MEMBERS'], [], flags);
results.partialBits = hasPermission(member([], [2n]), ['KICK_MEMBERS', 'ADMINISTRATOR'], [], flags);
results.neither = hasPermission(member(['1'], []), ['KICK_MEMBERS'], ['42'], flags);
results.unrestricted = hasPermission(null, [], [], flags);
results.noMember = hasPermission(null, ['KICK_MEMBERS'], [], flags);

// role toggle
const target = member(['mod'], []);
const role = { id: 'mod', name: 'Moderator' };
results.toggleFirst = await applyRoleAction(target, role, 'toggle');
results.heldAfterFirst = target.roles.cache.has('mod');
results.toggleSecond = await applyRoleAction(target, role, 'toggle');
results.heldAfterSecond = target.roles.cache.has('mod');

// buttons and lists
results.button = parseButtonCustomId(buttonCustomId('a:b', 3));
results.foreignButton = parseButtonCustomId('btn_x_1');
results.list = parseList(' a, ,b ,');

console.log(JSON.stringify(results));
"#;

const DISPATCH_SCENARIO: &str = r#"
const results = {};
const logged = [];
const log = {
  log: (...args) => logged.push(['log', args.map(String).join(' ')]),
  error: (...args) => logged.push(['error', args.map(String).join(' ')]),
};

class FakeEmbed {
  constructor() { this.data = { fields: [] }; }
  setColor(color) { this.data.color = color; return this; }
  setTitle(title) { this.data.title = title; return this; }
  setDescription(text) { this.data.description = text; return this; }
  addFields(fields) { this.data.fields.push(...fields); return this; }
}
class FakeButton {
  setCustomId(id) { this.customId = id; return this; }
  setLabel(label) { this.label = label; return this; }
  setStyle(style) { this.style = style; return this; }
}
class FakeRow {
  addComponents(...components) { this.components = components.flat(); return this; }
}

const sentReports = [];
const client = {
  channels: {
    fetch: async (id) => ({
      isTextBased: () => true,
      send: async (text) => {
        sentReports.push(id);
        throw new Error('missing access');
      },
    }),
  },
};

const dispatcher = createDispatcher({
  config: BOT_CONFIG,
  client,
  builders: { Embed: FakeEmbed, Button: FakeButton, Row: FakeRow, primaryStyle: 'primary' },
  permissionFlags: {},
  prefixReplyTypes: PREFIX_REPLY_TYPES,
  log,
});
const command = (name) => dispatcher.findCommand(name);

function interaction(overrides = {}) {
  return {
    user: { id: 'u1', tag: 'user#0001' },
    member: null,
    guild: null,
    channelId: 'c1',
    replied: false,
    deferred: false,
    replies: [],
    followUps: [],
    inGuild: () => false,
    isChatInputCommand: () => true,
    isButton: () => false,
    options: { getUser: () => null },
    async reply(payload) {
      this.replies.push(payload);
      this.replied = true;
      return this.sent;
    },
    async followUp(payload) {
      this.followUps.push(payload);
    },
    ...overrides,
  };
}

function message(content, overrides = {}) {
  return {
    content,
    author: { id: 'u2', bot: false, tag: 'user#0002' },
    member: null,
    guild: { name: 'Guild' },
    channelId: 'c1',
    replies: [],
    deleteAttempts: 0,
    inGuild: () => true,
    async reply(text) {
      this.replies.push(text);
    },
    async delete() {
      this.deleteAttempts += 1;
      throw new Error('missing permissions');
    },
    ...overrides,
  };
}

// A failing reaction does not stop the ones after it.
const reacted = [];
const voted = interaction({
  sent: {
    react: async (emoji) => {
      if (emoji === 'bad') throw new Error('unknown emoji');
      reacted.push(emoji);
    },
  },
});
await dispatcher.executeCommand(voted, command('vote'));
results.reacted = reacted;
results.reactionReply = voted.replies[0].content;
results.reactionErrors = logged.filter(([, line]) => line.startsWith('Failed to add reaction bad')).length;

// Fields missing a name or a value are dropped.
const shown = interaction();
await dispatcher.executeCommand(shown, command('info'));
results.embed = shown.replies[0].embeds[0].data;

// Buttons use the default label and stay within one row.
const picked = interaction();
await dispatcher.executeCommand(picked, command('pick'));
results.buttons = picked.replies[0].components[0].components.map((b) => [b.customId, b.label]);

// A failed error report is logged, never thrown.
let firstReply = true;
const broken = interaction({
  async reply(payload) {
    if (firstReply) {
      firstReply = false;
      throw new Error('gateway hiccup');
    }
    this.replies.push(payload);
  },
});
results.reportSettled = await dispatcher.executeCommand(broken, command('ping')).then(
  () => 'resolved',
  () => 'rejected',
);
results.failureReply = broken.replies.map((r) => r.content);
results.reportsAttempted = [...sentReports];
results.reportFailureLogged = logged.some(([, line]) => line.startsWith('Error sending error report:'));

// Once the interaction is acknowledged the failure notice goes out as a follow-up.
const deferred = interaction({
  deferred: true,
  async reply() {
    throw new Error('already acknowledged');
  },
});
await dispatcher.executeCommand(deferred, command('ping'));
results.followUps = deferred.followUps.map((f) => f.content);

// Prefix path: text-like types answer, the rest point at the slash command.
const textMessage = message('!ping now');
await dispatcher.handleMessage(textMessage);
results.prefixText = textMessage.replies;
results.prefixDeleteAttempts = textMessage.deleteAttempts;

const embedMessage = message('!INFO');
await dispatcher.handleMessage(embedMessage);
results.prefixEmbed = embedMessage.replies;

const customMessage = message('!custom');
await dispatcher.handleMessage(customMessage);
results.prefixCustom = customMessage.replies;

const dmMessage = message('!ping', { inGuild: () => false, guild: null });
await dispatcher.handleMessage(dmMessage);
results.dmReplies = dmMessage.replies;
results.dmDeleteAttempts = dmMessage.deleteAttempts;

const botMessage = message('!ping', { author: { id: 'b', bot: true, tag: 'bot#0000' } });
await dispatcher.handleMessage(botMessage);
results.botReplies = botMessage.replies;

console.log(JSON.stringify(results));
"#;

fn dispatch_config() -> BotConfig {
    BotConfig::from_json(json!({
        "name": "Helper",
        "token": "abc",
        "dmCommands": true,
        "deleteCommands": true,
        "errorChannelId": "errors",
        "commands": [
            { "name": "ping", "type": "text", "response": "pong" },
            { "name": "vote", "type": "reaction", "response": "Vote!", "reactions": "👍, bad, 🎉" },
            {
                "name": "info",
                "type": "embed",
                "embedTitle": "Info",
                "embedFields": [
                    { "name": "Rules", "value": "Be kind", "inline": true },
                    { "name": "", "value": "orphan" },
                    { "name": "Empty", "value": "" }
                ]
            },
            { "name": "pick", "type": "button", "buttonLabels": "A,B,C,D,E,F" },
            { "name": "custom", "type": "teleport", "response": "whoosh" }
        ]
    }))
    .unwrap()
}

fn node_available() -> bool {
    Command::new("node").arg("--version").output().is_ok_and(|o| o.status.success())
}

fn run_script(source: &str) -> Option<Value> {
    if !node_available() {
        eprintln!("node not found; skipping generated runtime checks");
        return None;
    }
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("scenario.mjs");
    std::fs::write(&script, source).unwrap();

    let output = Command::new("node").arg(&script).output().unwrap();
    assert!(
        output.status.success(),
        "node failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    Some(serde_json::from_slice(&output.stdout).unwrap())
}

fn dispatch_script(config: &BotConfig) -> String {
    let plan = BotPlan::build(config).unwrap();
    format!(
        "{MESSAGES}\n{}\n{POLICY_HELPERS}\n{DISPATCHER}\nconst BOT_CONFIG = {};\n{}\n{DISPATCH_SCENARIO}",
        runtime_defaults(),
        json_expr(&plan.embedded).unwrap(),
        prefix_reply_types(&plan),
    )
}

#[test]
fn generated_policy_helpers_behave() {
    let Some(r) = run_script(&format!("{POLICY_HELPERS}\n{SCENARIO}")) else { return };

    // A rejected call inside the window does not move it.
    assert_eq!(r["first"], 0);
    assert_eq!(r["during"], 5);
    assert_eq!(r["nearEnd"], 1);
    assert_eq!(r["after"], 0);
    assert_eq!(r["reset"], 9);
    assert_eq!(r["otherUser"], 0);
    assert_eq!(r["disabled"], 0);

    assert_eq!(r["allowedRoleId"], true);
    assert_eq!(r["allowedRoleName"], true);
    assert_eq!(r["permissionBits"], true);
    assert_eq!(r["partialBits"], false);
    assert_eq!(r["neither"], false);
    assert_eq!(r["unrestricted"], true);
    assert_eq!(r["noMember"], false);

    assert_eq!(r["toggleFirst"], "removed");
    assert_eq!(r["heldAfterFirst"], false);
    assert_eq!(r["toggleSecond"], "added");
    assert_eq!(r["heldAfterSecond"], true);

    assert_eq!(r["button"]["commandName"], "a:b");
    assert_eq!(r["button"]["index"], 3);
    assert_eq!(r["foreignButton"], Value::Null);
    assert_eq!(r["list"], serde_json::json!(["a", "b"]));
}

#[test]
fn generated_dispatcher_behaves() {
    let Some(r) = run_script(&dispatch_script(&dispatch_config())) else { return };

    assert_eq!(r["reacted"], json!(["👍", "🎉"]));
    assert_eq!(r["reactionReply"], "Vote!");
    assert_eq!(r["reactionErrors"], 1);

    assert_eq!(r["embed"]["color"], "#5865F2");
    assert_eq!(r["embed"]["title"], "Info");
    assert_eq!(r["embed"]["fields"], json!([{ "name": "Rules", "value": "Be kind", "inline": true }]));

    assert_eq!(
        r["buttons"],
        json!([
            ["btn:pick:0", "A"],
            ["btn:pick:1", "B"],
            ["btn:pick:2", "C"],
            ["btn:pick:3", "D"],
            ["btn:pick:4", "E"]
        ])
    );

    assert_eq!(r["reportSettled"], "resolved");
    assert_eq!(r["failureReply"], json!(["An error occurred while executing the command!"]));
    assert_eq!(r["reportsAttempted"], json!(["errors"]));
    assert_eq!(r["reportFailureLogged"], true);

    assert_eq!(r["followUps"], json!(["An error occurred while executing the command!"]));

    assert_eq!(r["prefixText"], json!(["pong"]));
    assert_eq!(r["prefixDeleteAttempts"], 1);
    assert_eq!(r["prefixEmbed"], json!(["This command can only be used as a slash command (/)."]));
    assert_eq!(r["prefixCustom"], json!(["whoosh"]));
    assert_eq!(r["dmReplies"], json!(["pong"]));
    assert_eq!(r["dmDeleteAttempts"], 0);
    assert_eq!(r["botReplies"], json!([]));
}
