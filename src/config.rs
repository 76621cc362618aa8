//! Runtime configuration for the API server and the bot
//!
//! Values arrive from the command line or the environment (`.env` is loaded
//! at startup) and are validated here into typed settings.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::FixedOffset;
use url::Url;

use crate::navigation::WebAppLinks;

pub const DEFAULT_DB_PATH: &str = "fitness_tracker.db";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5001";
pub const DEFAULT_UTC_OFFSET: &str = "+00:00";

/// Days returned by the history endpoint when no limit is given
pub const DEFAULT_HISTORY_DAYS: usize = 30;
/// Days the bot shows in /history
pub const BOT_HISTORY_DAYS: usize = 3;
/// Exercises listed under "top" in bot stats
pub const BOT_TOP_EXERCISES: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing value for {0}")]
    Missing(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Settings of the REST API
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub bind_address: SocketAddr,
    /// Built web front-end, served for every non-API path
    pub static_dir: Option<PathBuf>,
    pub utc_offset: FixedOffset,
}

/// Settings of the Telegram bot
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub token: String,
    pub links: WebAppLinks,
    pub utc_offset: FixedOffset,
}

impl BotConfig {
    pub fn new(token: &str, webapp_url: &str, utc_offset: FixedOffset) -> Result<Self, ConfigError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ConfigError::Missing("TELOXIDE_TOKEN".to_string()));
        }
        let url = Url::parse(webapp_url.trim())
            .map_err(|e| ConfigError::InvalidValue("WEBAPP_URL".to_string(), e.to_string()))?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConfigError::InvalidValue(
                "WEBAPP_URL".to_string(),
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(Self { token: token.to_string(), links: WebAppLinks::new(url), utc_offset })
    }
}

/// Parse `+03:00`, `-05:30`, `+3`, `Z` or `UTC` into a fixed offset.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, ConfigError> {
    let invalid = |why: &str| ConfigError::InvalidValue("UTC_OFFSET".to_string(), format!("'{}': {}", raw, why));
    let s = raw.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(|| invalid("out of range"));
    }

    let (sign, rest) = match s.chars().next() {
        Some('+') => (1, &s[1..]),
        Some('-') => (-1, &s[1..]),
        _ => return Err(invalid("expected a leading '+' or '-'")),
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().map_err(|_| invalid("bad hours"))?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid("bad minutes"))?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(invalid("out of range"));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(|| invalid("out of range"))
}
