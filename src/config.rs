use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use chrono::{FixedOffset, Offset, Utc};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {key} value: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    /// Spreadsheet webhook. `None` disables it.
    pub sheet_url: Option<String>,
    pub chat_token: Option<String>,
    pub chat_id: Option<String>,
    pub chat_api_base: String,
    pub currency: String,
    pub utc_offset: FixedOffset,
    pub channel_buffer: usize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let offset_hours: i32 = try_load("FOODIEQ_UTC_OFFSET_HOURS", "8")?;
        let utc_offset = FixedOffset::east_opt(offset_hours * 3600).ok_or_else(|| ConfigError::Invalid {
            key: "FOODIEQ_UTC_OFFSET_HOURS",
            message: format!("{offset_hours} hours is out of range"),
        })?;

        Ok(Self {
            data_dir: try_load::<String>("FOODIEQ_DATA_DIR", ".foodieq")?.into(),
            sheet_url: sheet_url(optional("FOODIEQ_SHEET_URL")),
            chat_token: optional("FOODIEQ_CHAT_TOKEN"),
            chat_id: optional("FOODIEQ_CHAT_ID"),
            chat_api_base: try_load("FOODIEQ_CHAT_API_BASE", "https://api.telegram.org")?,
            currency: try_load("FOODIEQ_CURRENCY", "RM")?,
            utc_offset,
            channel_buffer: try_load("FOODIEQ_CHANNEL_BUFFER", "100")?,
        })
    }

    /// Both halves of the bot configuration must be present.
    pub fn chat_credentials(&self) -> Option<(&str, &str)> {
        match (&self.chat_token, &self.chat_id) {
            (Some(token), Some(chat_id)) => Some((token, chat_id)),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".foodieq"),
            sheet_url: None,
            chat_token: None,
            chat_id: None,
            chat_api_base: "https://api.telegram.org".to_string(),
            currency: "RM".to_string(),
            utc_offset: FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix()),
            channel_buffer: 100,
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    optional(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid { key, message: e.to_string() }
        })
}

// Only https endpoints are honored; anything else disables the webhook.
fn sheet_url(url: Option<String>) -> Option<String> {
    match url {
        Some(url) if url.starts_with("https") => Some(url),
        Some(url) => {
            warn!(url = %url, "Sheet webhook is not https, disabling");
            None
        }
        None => {
            info!("FOODIEQ_SHEET_URL not set, sheet webhook disabled");
            None
        }
    }
}
