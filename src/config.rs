use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use poise::serenity_prelude::GuildId;

use crate::utils::timezone::parse_timezone;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CITY: &str = "Riyadh";
const DEFAULT_COUNTRY: &str = "SA";
const DEFAULT_METHOD: u8 = 4;
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_PLAYBACK_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set. Set it with: export {0}=...")]
    Missing(&'static str),

    #[error("Invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Location used to look up prayer timings
#[derive(Debug, Clone)]
pub struct PrayerLocation {
    pub city: String,
    pub country: String,
    pub method: u8,
    /// Forces the wall clock used for matching; the API's zone is used otherwise
    pub timezone: Option<Tz>,
}

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub admin_code: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub port: u16,
    pub public_domain: Option<String>,
    pub location: PrayerLocation,
    pub audio_dir: PathBuf,
    pub playback_timeout: Duration,
    pub dev_guild_id: Option<GuildId>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Only `DISCORD_TOKEN` is required. Everything else has a default or
    /// disables the feature that needs it.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;
        let method = parse_or("PRAYER_METHOD", get("PRAYER_METHOD"), DEFAULT_METHOD)?;
        let timeout_secs = parse_or(
            "PLAYBACK_TIMEOUT_SECS",
            get("PLAYBACK_TIMEOUT_SECS"),
            DEFAULT_PLAYBACK_TIMEOUT_SECS,
        )?;

        let timezone = match get("PRAYER_TIMEZONE") {
            Some(value) => Some(parse_timezone(&value).map_err(|_| ConfigError::Invalid {
                var: "PRAYER_TIMEZONE",
                value,
            })?),
            None => None,
        };

        let dev_guild_id = match get("DEV_GUILD_ID") {
            Some(value) => {
                let id = value.trim().parse::<u64>().ok().filter(|id| *id != 0).ok_or(
                    ConfigError::Invalid {
                        var: "DEV_GUILD_ID",
                        value: value.clone(),
                    },
                )?;
                Some(GuildId::new(id))
            }
            None => None,
        };

        let admin_code = get("ADMIN_CODE");

        Ok(Self {
            discord_token,
            admin_code,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            port,
            public_domain: get("RAILWAY_PUBLIC_DOMAIN"),
            location: PrayerLocation {
                city: get("PRAYER_CITY").unwrap_or_else(|| DEFAULT_CITY.to_string()),
                country: get("PRAYER_COUNTRY").unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
                method,
                timezone,
            },
            audio_dir: get("AUDIO_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(".")),
            playback_timeout: Duration::from_secs(timeout_secs),
            dev_guild_id,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn test_missing_token() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DISCORD_TOKEN", "abc")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.location.city, "Riyadh");
        assert_eq!(config.location.country, "SA");
        assert_eq!(config.location.method, 4);
        assert!(config.location.timezone.is_none());
        assert!(config.admin_code.is_none());
        assert_eq!(config.playback_timeout, Duration::from_secs(300));
        assert_eq!(config.audio_dir, PathBuf::from("."));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = load(&[("DISCORD_TOKEN", "abc"), ("ADMIN_CODE", "  ")]).unwrap();
        assert!(config.admin_code.is_none());
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(
            load(&[("DISCORD_TOKEN", "abc"), ("PORT", "eighty")]),
            Err(ConfigError::Invalid { var: "PORT", .. })
        ));
    }

    #[test]
    fn test_forced_timezone() {
        let config = load(&[("DISCORD_TOKEN", "abc"), ("PRAYER_TIMEZONE", "Asia/Riyadh")]).unwrap();
        assert_eq!(config.location.timezone, Some(chrono_tz::Asia::Riyadh));

        assert!(load(&[("DISCORD_TOKEN", "abc"), ("PRAYER_TIMEZONE", "Mars/Olympus")]).is_err());
    }

    #[test]
    fn test_dev_guild_zero_rejected() {
        assert!(load(&[("DISCORD_TOKEN", "abc"), ("DEV_GUILD_ID", "0")]).is_err());
        let config = load(&[("DISCORD_TOKEN", "abc"), ("DEV_GUILD_ID", "42")]).unwrap();
        assert_eq!(config.dev_guild_id, Some(GuildId::new(42)));
    }
}
