use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config/memebot.toml";

// every config file under config/ is TOML
pub fn conf_from_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, ConfigError> {
    Ok(toml::from_str::<T>(&std::fs::read_to_string(path)?)?)
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BotConfig {
    pub token: String,
    /// user id allowed to mutate the meme list
    pub owner: String,
    /// the bot's own user id, used to recognise its deleted messages
    pub bot_id: Option<String>,
    pub prefix: String,
    pub media_path: PathBuf,
    pub posted_path: PathBuf,
    pub default_channel: String,
    pub send_delay_ms: u64,
    pub upload_timeout_secs: u64,
    pub size_warn_bytes: u64,
    pub allowed_extensions: Vec<String>,
    pub sent_capacity: usize,
    pub sent_ttl_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner: String::new(),
            bot_id: None,
            prefix: String::from("!"),
            media_path: PathBuf::from("memes.json"),
            posted_path: PathBuf::from("posted_memes.json"),
            default_channel: String::from("general"),
            send_delay_ms: 1000,
            upload_timeout_secs: 60,
            size_warn_bytes: 8 * 1024 * 1024,
            allowed_extensions: [".png", ".jpg", ".jpeg", ".gif"]
                .into_iter()
                .map(String::from)
                .collect(),
            sent_capacity: 512,
            sent_ttl_secs: 60 * 60,
        }
    }
}

impl BotConfig {
    /// Reads the TOML config (path from MEMEBOT_CONFIG, else `config/memebot.toml`),
    /// then applies MEMEBOT_TOKEN / MEMEBOT_OWNER. A missing file falls back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("MEMEBOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let conf = if std::path::Path::new(&path).exists() {
            conf_from_file(&path)?
        } else {
            tracing::warn!(%path, "config file not found, using defaults");
            Self::default()
        };

        conf.with_env(
            std::env::var("MEMEBOT_TOKEN").ok(),
            std::env::var("MEMEBOT_OWNER").ok(),
        )
        .validate()
    }

    pub fn with_env(mut self, token: Option<String>, owner: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.token = token;
        }
        if let Some(owner) = owner.filter(|o| !o.is_empty()) {
            self.owner = owner;
        }
        self
    }

    /// Fills `bot_id` unless the config file already set it.
    pub fn with_bot_id(mut self, id: impl Into<String>) -> Self {
        if self.bot_id.is_none() {
            self.bot_id = Some(id.into());
        }
        self
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.owner.is_empty() {
            return Err(ConfigError::MissingOwner);
        }
        Ok(self)
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn sent_ttl(&self) -> Duration {
        Duration::from_secs(self.sent_ttl_secs)
    }

    pub fn is_owner(&self, user: &str) -> bool {
        self.owner == user
    }

    /// Case-insensitive suffix match against `allowed_extensions`.
    pub fn is_supported(&self, filename: &str) -> bool {
        let filename = filename.to_lowercase();
        self.allowed_extensions
            .iter()
            .any(|ext| filename.ends_with(&ext.to_lowercase()))
    }
}
