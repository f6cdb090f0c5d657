//! Container image and compose file.

use crate::js::str_lit;
use crate::plan::BotPlan;

const DOCKERFILE: &str = r#"FROM node:20-alpine

WORKDIR /app

COPY package*.json ./
RUN npm install --omit=dev

COPY . .

RUN addgroup -g 1001 -S nodejs && adduser -S nodejs -u 1001 -G nodejs \
    && chown -R nodejs:nodejs /app
USER nodejs

CMD ["npm", "start"]
"#;

pub fn dockerfile() -> String {
    DOCKERFILE.to_string()
}

/// Compose file; the container is named `<slug>-bot`.
pub fn compose(plan: &BotPlan) -> String {
    // JSON strings are valid YAML double-quoted scalars.
    let container_name = str_lit(&format!("{}-bot", plan.slug));
    format!(
        "services:
  bot:
    build: .
    container_name: {container_name}
    restart: unless-stopped
    environment:
      - NODE_ENV=production
    env_file:
      - .env
    volumes:
      - ./logs:/app/logs
    networks:
      - bot-network

networks:
  bot-network:
    driver: bridge
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use botweaver_common::models::BotConfig;

    #[test]
    fn compose_uses_slug() {
        let cfg = BotConfig { name: "My Bot".into(), ..Default::default() };
        let plan = BotPlan::build(&cfg).unwrap();
        assert!(compose(&plan).contains("container_name: \"my-bot-bot\"\n"));
    }

    #[test]
    fn image_runs_start_script() {
        assert!(dockerfile().ends_with("CMD [\"npm\", \"start\"]\n"));
    }
}
