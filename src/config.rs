use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use teloxide::types::{ChatId, MessageId, ThreadId};

use crate::error::BotError;

const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    /// Addresses returned verbatim by /emails
    #[serde(default)]
    pub emails: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Supergroup whose forum topics the bot manages
    pub group_id: i64,
    /// Thread targeted by /edit and /delete
    #[serde(default = "default_managed_thread_id")]
    pub managed_thread_id: i32,
}

fn default_managed_thread_id() -> i32 {
    4
}

impl Config {
    pub fn group(&self) -> ChatId {
        ChatId(self.telegram.group_id)
    }

    pub fn managed_thread(&self) -> ThreadId {
        ThreadId(MessageId(self.telegram.managed_thread_id))
    }

    /// Message body sent by /emails.
    pub fn email_list_text(&self) -> String {
        self.emails.join("\n")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.telegram.bot_token.is_empty() {
            if let Ok(token) = std::env::var(TOKEN_ENV) {
                config.telegram.bot_token = token;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), BotError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(BotError::Configuration(format!(
                "telegram.bot_token is empty and {TOKEN_ENV} is not set"
            )));
        }
        if self.telegram.group_id == 0 {
            return Err(BotError::Configuration(
                "telegram.group_id must be set".to_string(),
            ));
        }
        if self.telegram.managed_thread_id <= 0 {
            return Err(BotError::Configuration(format!(
                "telegram.managed_thread_id must be positive, got {}",
                self.telegram.managed_thread_id
            )));
        }
        Ok(())
    }
}
