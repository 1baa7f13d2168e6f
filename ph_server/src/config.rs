//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use party_hub::{
    HubSettings, RoomSettings,
    game::{
        awful::CardPack,
        constants::{AWFUL_WIN_SCORE, DEFAULT_CAPACITY, MAX_CAPACITY, MIN_CAPACITY},
    },
};
use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Prometheus exporter address, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Room defaults configuration
    pub rooms: RoomDefaultsConfig,
    /// Awful Answers content pack, built-in pack when unset
    pub card_pack_path: Option<PathBuf>,
    /// JSON accounts file for password logins
    pub accounts_path: Option<PathBuf>,
    /// Peer addresses granted admin capability on connect
    pub admin_origins: Vec<IpAddr>,
}

/// Default room configuration
#[derive(Debug, Clone)]
pub struct RoomDefaultsConfig {
    /// Maximum live rooms
    pub max_rooms: usize,
    /// Capacity for rooms created without one
    pub default_capacity: usize,
    /// Round wins needed to take an Awful Answers game
    pub awful_win_score: u32,
    /// Seconds between a decisive Awful Answers win and room teardown
    pub teardown_secs: u64,
}

impl Default for RoomDefaultsConfig {
    fn default() -> Self {
        Self {
            max_rooms: 1000,
            default_capacity: DEFAULT_CAPACITY,
            awful_win_score: AWFUL_WIN_SCORE,
            teardown_secs: 10,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 6969)),
            metrics_bind: None,
            rooms: RoomDefaultsConfig::default(),
            card_pack_path: None,
            accounts_path: None,
            admin_origins: vec![
                IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(Ipv6Addr::LOCALHOST),
            ],
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `max_rooms_override` - Optional room cap override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<ServerConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but can't be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        max_rooms_override: Option<usize>,
    ) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env_strict("SERVER_BIND")?.unwrap_or(defaults.bind),
        };
        let metrics_bind = parse_env_strict("METRICS_BIND")?;

        let rooms = RoomDefaultsConfig {
            max_rooms: max_rooms_override
                .unwrap_or_else(|| parse_env_or("MAX_ROOMS", defaults.rooms.max_rooms)),
            default_capacity: parse_env_or("DEFAULT_CAPACITY", defaults.rooms.default_capacity),
            awful_win_score: parse_env_or("AWFUL_WIN_SCORE", defaults.rooms.awful_win_score),
            teardown_secs: parse_env_or("ROOM_TEARDOWN_SECS", defaults.rooms.teardown_secs),
        };

        let admin_origins = match std::env::var("ADMIN_ORIGINS") {
            Ok(raw) => parse_origins(&raw)?,
            Err(_) => defaults.admin_origins,
        };

        Ok(ServerConfig {
            bind,
            metrics_bind,
            rooms,
            card_pack_path: std::env::var("CARD_PACK_PATH").ok().map(PathBuf::from),
            accounts_path: std::env::var("ACCOUNTS_PATH").ok().map(PathBuf::from),
            admin_origins,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rooms.max_rooms == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_ROOMS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&self.rooms.default_capacity) {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_CAPACITY".to_string(),
                reason: format!("Must be between {MIN_CAPACITY} and {MAX_CAPACITY}"),
            });
        }

        if self.rooms.awful_win_score == 0 {
            return Err(ConfigError::Invalid {
                var: "AWFUL_WIN_SCORE".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: "Must differ from SERVER_BIND".to_string(),
            });
        }

        Ok(())
    }

    /// Build hub settings, loading the card pack if one is configured
    pub fn hub_settings(&self) -> Result<HubSettings, ConfigError> {
        let card_pack = match &self.card_pack_path {
            Some(path) => CardPack::from_file(path).map_err(|e| ConfigError::Invalid {
                var: "CARD_PACK_PATH".to_string(),
                reason: e.to_string(),
            })?,
            None => CardPack::builtin(),
        };

        Ok(HubSettings {
            rooms: RoomSettings {
                max_rooms: self.rooms.max_rooms,
                teardown_delay: Duration::from_secs(self.rooms.teardown_secs),
                awful_win_score: self.rooms.awful_win_score,
                card_pack: Arc::new(card_pack),
            },
            default_capacity: self.rooms.default_capacity,
        })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse an optional variable, failing on a present but malformed value
fn parse_env_strict<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::Invalid {
                    var: key.to_string(),
                    reason: format!("Can't parse '{raw}'"),
                })
        }
        _ => Ok(None),
    }
}

/// Parse a comma-separated list of IP addresses
fn parse_origins(raw: &str) -> Result<Vec<IpAddr>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| ConfigError::Invalid {
                var: "ADMIN_ORIGINS".to_string(),
                reason: format!("'{s}' is not an IP address"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "MAX_ROOMS".to_string(),
            reason: "Must be greater than 0".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("MAX_ROOMS"));
        assert!(msg.contains("greater than 0"));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.admin_origins.contains(&IpAddr::V4(Ipv4Addr::LOCALHOST)));
    }

    #[test]
    fn test_config_validation_zero_rooms() {
        let mut config = ServerConfig::default();
        config.rooms.max_rooms = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "MAX_ROOMS"));
    }

    #[test]
    fn test_config_validation_capacity_out_of_range() {
        let mut config = ServerConfig::default();
        config.rooms.default_capacity = 1;
        assert!(config.validate().is_err());
        config.rooms.default_capacity = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_metrics_clash() {
        let mut config = ServerConfig::default();
        config.metrics_bind = Some(config.bind);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins("10.0.0.1, ::1,,").unwrap();
        assert_eq!(origins.len(), 2);
        assert!(parse_origins("not-an-ip").is_err());
        assert!(parse_origins("").unwrap().is_empty());
    }

    #[test]
    fn test_hub_settings_from_config() {
        let mut config = ServerConfig::default();
        config.rooms.teardown_secs = 3;
        config.rooms.awful_win_score = 5;
        let settings = config.hub_settings().unwrap();
        assert_eq!(settings.rooms.teardown_delay, Duration::from_secs(3));
        assert_eq!(settings.rooms.awful_win_score, 5);
        assert_eq!(settings.default_capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn test_missing_card_pack_is_invalid() {
        let config = ServerConfig {
            card_pack_path: Some(PathBuf::from("/nonexistent/pack.json")),
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.hub_settings(),
            Err(ConfigError::Invalid { var, .. }) if var == "CARD_PACK_PATH"
        ));
    }
}
