//! Server configuration.
//!
//! Defaults can be overridden from the environment (after loading `.env`)
//! and then by command-line flags through the `with_*` builders.

use thiserror::Error;
use tt_dice::DiceConfig;

use crate::dice::DEFAULT_MAX_DICE;
use crate::session::{Player, StaticSessions};

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable held a value that could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

/// Configuration for the dice server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Whether rolls with a resolver key are classified.
    pub enable_success_types: bool,
    /// Known session tokens.
    pub sessions: Vec<(String, Player)>,
    /// Bounds of the simulated rolling latency, in milliseconds.
    pub roll_delay_ms: (u64, u64),
    /// Maximum dice per single roll, and entries per array roll.
    pub max_dice: usize,
    /// Which die and table each kind of check uses.
    pub dice: DiceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_success_types: false,
            sessions: Vec::new(),
            roll_delay_ms: (600, 1000),
            max_dice: DEFAULT_MAX_DICE,
            dice: DiceConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load `.env` if present, then read `TT_*` variables over the defaults.
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read `TT_*` variables through `lookup` over the defaults.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("TT_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("TT_PORT") {
            config.port = parse_value("TT_PORT", &port)?;
        }
        if let Some(flag) = lookup("TT_ENABLE_SUCCESS_TYPES") {
            config.enable_success_types = parse_bool("TT_ENABLE_SUCCESS_TYPES", &flag)?;
        }
        if let Some(sessions) = lookup("TT_SESSIONS") {
            config.sessions = parse_sessions(&sessions)?;
        }
        if let Some(delay) = lookup("TT_ROLL_DELAY_MS") {
            config.roll_delay_ms = parse_delay(&delay)?;
        }
        if let Some(max) = lookup("TT_MAX_DICE") {
            config.max_dice = parse_value("TT_MAX_DICE", &max)?;
            if config.max_dice == 0 {
                return Err(invalid("TT_MAX_DICE", &max));
            }
        }
        if let Some(dice) = lookup("TT_DICE_CONFIG") {
            config.dice =
                DiceConfig::from_json(&dice).map_err(|_| invalid("TT_DICE_CONFIG", &dice))?;
        }

        Ok(config)
    }

    /// Set the bind host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the bind port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Turn success classification on or off.
    pub fn with_success_types(mut self, enabled: bool) -> Self {
        self.enable_success_types = enabled;
        self
    }

    /// Add a session token.
    pub fn with_session(mut self, token: impl Into<String>, player: Player) -> Self {
        self.sessions.push((token.into(), player));
        self
    }

    /// Set the latency bounds. Zero disables the delay.
    pub fn with_roll_delay(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.roll_delay_ms = (min_ms.min(max_ms), max_ms.max(min_ms));
        self
    }

    /// Set the dice limit (at least one).
    pub fn with_max_dice(mut self, max_dice: usize) -> Self {
        self.max_dice = max_dice.max(1);
        self
    }

    /// The configured sessions as a resolver.
    pub fn session_table(&self) -> StaticSessions {
        self.sessions.iter().cloned().collect()
    }

    /// `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

/// `token:id[:admin],...`
fn parse_sessions(value: &str) -> ConfigResult<Vec<(String, Player)>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.split(':');
            let token = parts.next().filter(|t| !t.is_empty());
            let id = parts.next().and_then(|id| id.parse::<i64>().ok());
            let admin = match parts.next() {
                None => false,
                Some("admin") => true,
                Some(_) => return Err(invalid("TT_SESSIONS", entry)),
            };
            match (token, id, parts.next()) {
                (Some(token), Some(id), None) => Ok((token.to_string(), Player { id, admin })),
                _ => Err(invalid("TT_SESSIONS", entry)),
            }
        })
        .collect()
}

/// `min-max` or a single value for both bounds.
fn parse_delay(value: &str) -> ConfigResult<(u64, u64)> {
    let parse = |s: &str| {
        s.trim()
            .parse::<u64>()
            .map_err(|_| invalid("TT_ROLL_DELAY_MS", value))
    };
    match value.split_once('-') {
        Some((min, max)) => {
            let (min, max) = (parse(min)?, parse(max)?);
            if min > max {
                return Err(invalid("TT_ROLL_DELAY_MS", value));
            }
            Ok((min, max))
        }
        None => {
            let ms = parse(value)?;
            Ok((ms, ms))
        }
    }
}
