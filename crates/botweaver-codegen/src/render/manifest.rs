//! `package.json` for the generated project.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::GenerateError;
use crate::js::json_expr;
use crate::plan::BotPlan;

pub const DISCORD_JS_VERSION: &str = "^14.16.1";
pub const DOTENV_VERSION: &str = "^16.4.5";
pub const NODEMON_VERSION: &str = "^3.0.2";

#[derive(Debug, Serialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: &'static str,
    pub description: String,
    pub main: &'static str,
    #[serde(rename = "type")]
    pub module_type: &'static str,
    pub scripts: BTreeMap<&'static str, &'static str>,
    pub dependencies: BTreeMap<&'static str, &'static str>,
    #[serde(rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<&'static str, &'static str>,
    pub engines: BTreeMap<&'static str, &'static str>,
}

impl PackageManifest {
    pub fn for_plan(plan: &BotPlan) -> Self {
        let description = match plan.embedded.description.trim() {
            "" => "Discord bot created with BotWeaver".to_string(),
            d => d.to_string(),
        };
        Self {
            name: plan.slug.clone(),
            version: "1.0.0",
            description,
            main: "index.js",
            module_type: "module",
            scripts: BTreeMap::from([("start", "node index.js"), ("dev", "nodemon index.js")]),
            dependencies: BTreeMap::from([
                ("discord.js", DISCORD_JS_VERSION),
                ("dotenv", DOTENV_VERSION),
            ]),
            dev_dependencies: BTreeMap::from([("nodemon", NODEMON_VERSION)]),
            engines: BTreeMap::from([("node", ">=18")]),
        }
    }
}

pub fn render(plan: &BotPlan) -> Result<String, GenerateError> {
    let mut out = json_expr(&PackageManifest::for_plan(plan))?;
    out.push('\n');
    Ok(out)
}
