//! `.env` holding the credential.

use botweaver_common::models::BotConfig;

/// Variable the entrypoint reads the token from.
pub const TOKEN_VAR: &str = "DISCORD_TOKEN";

/// Written when the configuration carries no token.
pub const TOKEN_PLACEHOLDER: &str = "YOUR_BOT_TOKEN_HERE";

pub fn render(config: &BotConfig) -> String {
    // A newline inside the value would let it inject further variables.
    let token: String = config
        .token
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n'))
        .collect();
    let value = if token.is_empty() { TOKEN_PLACEHOLDER } else { token.as_str() };
    format!("# Discord bot token\n{TOKEN_VAR}={value}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_gets_placeholder() {
        let env = render(&BotConfig::default());
        assert_eq!(env, "# Discord bot token\nDISCORD_TOKEN=YOUR_BOT_TOKEN_HERE\n");
    }

    #[test]
    fn newlines_are_stripped() {
        let cfg = BotConfig { token: "abc\nEVIL=1".into(), ..Default::default() };
        assert_eq!(render(&cfg), "# Discord bot token\nDISCORD_TOKEN=abcEVIL=1\n");
    }
}
