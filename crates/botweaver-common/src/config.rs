//! Application configuration loaded from environment variables and config files.
//!
//! Supports `.env` files for development and environment variables for production.
//! Config precedence: env vars > .env file > botweaver.toml > defaults

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Get the global application configuration.
///
/// # Panics
/// Panics if config has not been initialized via [`init`].
pub fn get() -> &'static AppConfig {
    CONFIG.get().expect("Config not initialized. Call botweaver_common::config::init() first.")
}

/// Initialize the global configuration from environment.
///
/// Should be called once at application startup, before any other code accesses config.
pub fn init() -> Result<&'static AppConfig, config::ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    let app_config = load()?;
    Ok(CONFIG.get_or_init(|| app_config))
}

/// Build a configuration without touching the global slot.
pub fn load() -> Result<AppConfig, config::ConfigError> {
    let cfg = config::Config::builder()
        // Defaults
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3001)?
        .set_default("server.body_limit_bytes", 10 * 1024 * 1024)?
        .set_default("supervisor.staging_dir", "./temp")?
        .set_default("supervisor.install_command", vec!["npm", "install"])?
        .set_default("supervisor.runtime_command", vec!["node", "index.js"])?
        .set_default("supervisor.install_timeout_secs", 60)?
        .set_default("supervisor.cleanup_delay_secs", 5)?
        .set_default("supervisor.stop_grace_secs", 10)?
        .set_default("supervisor.log_capacity", 500)?
        .set_default("supervisor.status_tail", 50)?
        // Optional config file
        .add_source(config::File::with_name("botweaver").required(false))
        // Environment variables (BOTWEAVER__SERVER__PORT, BOTWEAVER__SUPERVISOR__STAGING_DIR, etc.)
        .add_source(
            config::Environment::with_prefix("BOTWEAVER")
                .prefix_separator("__")
                .separator("__")
                .list_separator(" ")
                .with_list_parse_key("supervisor.install_command")
                .with_list_parse_key("supervisor.runtime_command")
                .try_parsing(true),
        )
        .build()?;

    cfg.try_deserialize()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub supervisor: SupervisorSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body (configurations can embed long responses).
    pub body_limit_bytes: usize,
}

/// Settings for hosting generated bots on this machine.
#[derive(Debug, Deserialize, Clone)]
pub struct SupervisorSettings {
    /// Root under which per-run staging directories are created.
    pub staging_dir: PathBuf,
    /// Program + args that install the generated project's dependencies.
    pub install_command: Vec<String>,
    /// Program + args that run the generated entrypoint.
    pub runtime_command: Vec<String>,
    pub install_timeout_secs: u64,
    /// Delay between process exit and staging directory removal.
    pub cleanup_delay_secs: u64,
    /// Time a bot gets to exit after SIGTERM before it is killed.
    pub stop_grace_secs: u64,
    /// Log lines retained per running bot.
    pub log_capacity: usize,
    /// Log lines returned by a status query.
    pub status_tail: usize,
}

impl SupervisorSettings {
    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.cleanup_delay_secs)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_secs(self.stop_grace_secs)
    }
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("./temp"),
            install_command: vec!["npm".into(), "install".into()],
            runtime_command: vec!["node".into(), "index.js".into()],
            install_timeout_secs: 60,
            cleanup_delay_secs: 5,
            stop_grace_secs: 10,
            log_capacity: 500,
            status_tail: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_sources() {
        let cfg = load().expect("defaults should deserialize");
        assert_eq!(cfg.server.port, 3001);
        assert_eq!(cfg.supervisor.install_command, vec!["npm", "install"]);
        assert_eq!(cfg.supervisor.runtime_command, vec!["node", "index.js"]);
        assert_eq!(cfg.supervisor.install_timeout(), Duration::from_secs(60));
        assert_eq!(cfg.supervisor.status_tail, 50);
    }
}
