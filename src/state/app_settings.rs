use crate::state::countdown::Deadline;
use chrono_tz::Tz;
use log::{LevelFilter, warn};
use pool_api::client::DEFAULT_BASE_URL;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_REFRESH_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub api_url: String,
    /// Pick deadline; its timezone is also used to show kickoff times.
    pub deadline: Deadline,
    pub refresh_interval: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            api_url: DEFAULT_BASE_URL.to_string(),
            deadline: Deadline::default(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
        }
    }
}

impl AppSettings {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from a key lookup. Bad values are logged and replaced
    /// by their defaults.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = value("POOLTUI_API_URL").unwrap_or(defaults.api_url);

        let tz = match value("POOLTUI_TIMEZONE") {
            Some(raw) => Tz::from_str(&raw).unwrap_or_else(|_| {
                warn!("Invalid POOLTUI_TIMEZONE: {raw} (expected IANA tz like Europe/Vienna)");
                defaults.deadline.tz
            }),
            None => defaults.deadline.tz,
        };

        let deadline = match value("POOLTUI_DEADLINE") {
            Some(raw) => Deadline::parse(&raw, tz).unwrap_or_else(|| {
                warn!("Invalid POOLTUI_DEADLINE: {raw} (expected e.g. \"sun 19\")");
                Deadline { tz, ..defaults.deadline }
            }),
            None => Deadline { tz, ..defaults.deadline },
        };

        let refresh_interval = match value("POOLTUI_REFRESH_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!("Invalid POOLTUI_REFRESH_SECS: {raw} (expected positive integer)");
                    defaults.refresh_interval
                }
            },
            None => defaults.refresh_interval,
        };

        let log_level = value("POOLTUI_LOG").and_then(|raw| {
            LevelFilter::from_str(&raw)
                .map_err(|_| warn!("Invalid POOLTUI_LOG: {raw}"))
                .ok()
        });

        Self {
            full_screen: false,
            log_level,
            api_url,
            deadline,
            refresh_interval,
        }
    }
}
