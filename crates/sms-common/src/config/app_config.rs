//! Application configuration structs
//!
//! Loads configuration from environment variables and an optional `.env` file.
//! Every setting has a default so the gateway runs with an empty environment.

use serde::Deserialize;
use sms_core::ValidationProfile;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub hub: HubConfig,
    pub connection: ConnectionConfig,
    pub relay: RelayConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: default_env(),
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// HTTP/WebSocket listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served as the operator console
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

/// Hub configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Outbound queue capacity of every connection
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Size of the hub command mailbox
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            command_buffer: default_command_buffer(),
        }
    }
}

/// Per-connection liveness and framing limits
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_write_wait_ms")]
    pub write_wait_ms: u64,
    #[serde(default = "default_pong_wait_ms")]
    pub pong_wait_ms: u64,
    #[serde(default = "default_ping_period_ms")]
    pub ping_period_ms: u64,
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
}

impl ConnectionConfig {
    /// Deadline for a single frame write
    #[must_use]
    pub fn write_wait(&self) -> Duration {
        Duration::from_millis(self.write_wait_ms)
    }

    /// Maximum silence from the peer before the connection is dropped
    #[must_use]
    pub fn pong_wait(&self) -> Duration {
        Duration::from_millis(self.pong_wait_ms)
    }

    /// Keepalive ping interval
    #[must_use]
    pub fn ping_period(&self) -> Duration {
        Duration::from_millis(self.ping_period_ms)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            write_wait_ms: default_write_wait_ms(),
            pong_wait_ms: default_pong_wait_ms(),
            ping_period_ms: default_ping_period_ms(),
            max_message_size: default_max_message_size(),
        }
    }
}

/// MT/MO/DLR relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_dlr_delay_ms")]
    pub dlr_delay_ms: u64,
    /// Kickback reported in every synthetic DLR
    #[serde(default)]
    pub dlr_kickback: f64,
    #[serde(default)]
    pub validation_profile: ValidationProfile,
    /// Per-call timeout for outbound MO and DLR posts
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,
}

impl RelayConfig {
    #[must_use]
    pub fn dlr_delay(&self) -> Duration {
        Duration::from_millis(self.dlr_delay_ms)
    }

    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            dlr_delay_ms: default_dlr_delay_ms(),
            dlr_kickback: 0.0,
            validation_profile: ValidationProfile::default(),
            http_timeout_ms: default_http_timeout_ms(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "sms-gateway".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_static_dir() -> String {
    "./public".to_string()
}

fn default_queue_capacity() -> usize {
    256
}

fn default_command_buffer() -> usize {
    1024
}

fn default_write_wait_ms() -> u64 {
    10_000
}

fn default_pong_wait_ms() -> u64 {
    60_000
}

fn default_ping_period_ms() -> u64 {
    54_000 // 9/10 of the pong wait
}

fn default_max_message_size() -> usize {
    4096
}

fn default_dlr_delay_ms() -> u64 {
    2000
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let config = Self {
            app: AppSettings {
                name: vars.string("APP_NAME", default_app_name),
                env: vars.parse("APP_ENV", default_env)?,
            },
            server: ServerConfig {
                host: vars.string("SMS_HOST", default_host),
                port: vars.parse("SMS_PORT", default_port)?,
                static_dir: vars.string("SMS_STATIC_DIR", default_static_dir),
            },
            hub: HubConfig {
                queue_capacity: vars.parse("HUB_QUEUE_CAPACITY", default_queue_capacity)?,
                command_buffer: vars.parse("HUB_COMMAND_BUFFER", default_command_buffer)?,
            },
            connection: ConnectionConfig {
                write_wait_ms: vars.parse("WS_WRITE_WAIT_MS", default_write_wait_ms)?,
                pong_wait_ms: vars.parse("WS_PONG_WAIT_MS", default_pong_wait_ms)?,
                ping_period_ms: vars.parse("WS_PING_PERIOD_MS", default_ping_period_ms)?,
                max_message_size: vars.parse("WS_MAX_MESSAGE_SIZE", default_max_message_size)?,
            },
            relay: RelayConfig {
                dlr_delay_ms: vars.parse("DLR_DELAY_MS", default_dlr_delay_ms)?,
                dlr_kickback: vars.parse("DLR_KICKBACK", || 0.0)?,
                validation_profile: vars.parse("MT_VALIDATION_PROFILE", ValidationProfile::default)?,
                http_timeout_ms: vars.parse("HTTP_CLIENT_TIMEOUT_MS", default_http_timeout_ms)?,
            },
        };

        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.hub.queue_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "HUB_QUEUE_CAPACITY",
                "must be at least 1".to_string(),
            ));
        }
        if self.hub.command_buffer == 0 {
            return Err(ConfigError::InvalidValue(
                "HUB_COMMAND_BUFFER",
                "must be at least 1".to_string(),
            ));
        }
        if self.connection.ping_period_ms == 0
            || self.connection.ping_period_ms >= self.connection.pong_wait_ms
        {
            return Err(ConfigError::InvalidValue(
                "WS_PING_PERIOD_MS",
                format!(
                    "must be between 1 and WS_PONG_WAIT_MS ({})",
                    self.connection.pong_wait_ms
                ),
            ));
        }
        Ok(())
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &str, default: fn() -> String) -> String {
        (self.0)(key).unwrap_or_else(default)
    }

    fn parse<T>(&self, key: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.0)(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue(key, e.to_string())),
            None => Ok(default()),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
