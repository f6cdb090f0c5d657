//! BotWeaver code generator.
//!
//! [`generate`] turns a [`BotConfig`] into the files of a runnable discord.js
//! project. It is pure: no I/O, no clock, no randomness, so the same
//! configuration always yields byte-identical files.

pub mod error;
pub mod intents;
pub mod js;
pub mod plan;
pub mod render;

use std::collections::BTreeMap;

use botweaver_common::models::BotConfig;
use tracing::debug;

pub use error::GenerateError;
pub use intents::GatewayIntents;
pub use plan::BotPlan;

pub const MANIFEST: &str = "package.json";
pub const ENTRYPOINT: &str = "index.js";
pub const ENV_FILE: &str = ".env";
pub const README: &str = "README.md";
pub const DOCKERFILE: &str = "Dockerfile";
pub const COMPOSE_FILE: &str = "docker-compose.yml";
pub const INSTALL_SH: &str = "install.sh";
pub const INSTALL_BAT: &str = "install.bat";

/// A generated project: relative path to file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectArtifact {
    pub files: BTreeMap<String, String>,
    /// Relative path of the file the runtime executes.
    pub entrypoint: String,
}

impl ProjectArtifact {
    /// Unix permission bits a file should be written with.
    pub fn file_mode(&self, path: &str) -> u32 {
        if path == INSTALL_SH { 0o755 } else { 0o644 }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }
}

/// Generate every file of the project for `config`.
pub fn generate(config: &BotConfig) -> Result<ProjectArtifact, GenerateError> {
    let plan = BotPlan::build(config)?;

    let files = BTreeMap::from([
        (MANIFEST.to_string(), render::manifest::render(&plan)?),
        (ENTRYPOINT.to_string(), render::entrypoint::render(&plan)?),
        (ENV_FILE.to_string(), render::env::render(config)),
        (README.to_string(), render::readme::render(&plan)),
        (DOCKERFILE.to_string(), render::container::dockerfile()),
        (COMPOSE_FILE.to_string(), render::container::compose(&plan)),
        (INSTALL_SH.to_string(), render::scripts::install_sh()),
        (INSTALL_BAT.to_string(), render::scripts::install_bat()),
    ]);

    debug!(
        slug = %plan.slug,
        commands = config.commands.len(),
        intents = ?plan.intents,
        "Generated bot project"
    );

    Ok(ProjectArtifact { files, entrypoint: ENTRYPOINT.to_string() })
}
