use std::net::SocketAddr;
use std::time::Duration;

use super::typed::{key, ConfigProperties};
use super::{ConfigError, SlowConfig};

/// Storage connection settings under `database.*`.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Full connection URL; when set it takes precedence over the discrete fields.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    /// Statements slower than this are logged at warn level.
    pub slow_threshold: Duration,
}

impl DatabaseConfig {
    pub const DEFAULT_PORT: u16 = 3306;
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 3000;
    pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
    pub const DEFAULT_SLOW_THRESHOLD_MS: u64 = 1000;
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .field("slow_threshold", &self.slow_threshold)
            .finish()
    }
}

impl ConfigProperties for DatabaseConfig {
    fn prefix() -> &'static str {
        "database"
    }

    fn from_config(config: &SlowConfig) -> Result<Self, ConfigError> {
        let p = Self::prefix();
        let url: Option<String> = config.get_or(&key(p, "url"), None)?;
        // Discrete fields are only mandatory without a URL.
        let required = |name: &str| -> Result<String, ConfigError> {
            if url.is_some() {
                config.get_or(&key(p, name), String::new())
            } else {
                config.get(&key(p, name))
            }
        };

        let db = DatabaseConfig {
            host: required("host")?,
            port: config.get_or(&key(p, "port"), Self::DEFAULT_PORT)?,
            name: required("name")?,
            user: required("user")?,
            password: config.get_or(&key(p, "password"), String::new())?,
            max_connections: config
                .get_or(&key(p, "max_connections"), Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: config.get_or(&key(p, "min_connections"), 0)?,
            acquire_timeout: Duration::from_millis(
                config.get_or(&key(p, "acquire_timeout_ms"), Self::DEFAULT_ACQUIRE_TIMEOUT_MS)?,
            ),
            idle_timeout: Duration::from_secs(
                config.get_or(&key(p, "idle_timeout_secs"), Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            ),
            slow_threshold: Duration::from_millis(
                config.get_or(&key(p, "slow_threshold_ms"), Self::DEFAULT_SLOW_THRESHOLD_MS)?,
            ),
            url,
        };
        if db.min_connections > db.max_connections {
            return Err(ConfigError::TypeMismatch {
                key: key(p, "min_connections"),
                expected: "a value not greater than database.max_connections",
            });
        }
        Ok(db)
    }
}

/// HTTP listener settings under `server.*`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Per-request deadline propagated to storage calls.
    pub request_timeout: Duration,
    /// How long in-flight requests may run after a shutdown signal.
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    pub const DEFAULT_ADDR: &'static str = "0.0.0.0:1323";
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: SocketAddr::from(([0, 0, 0, 0], 1323)),
            request_timeout: Duration::from_millis(5000),
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

impl ConfigProperties for ServerConfig {
    fn prefix() -> &'static str {
        "server"
    }

    fn from_config(config: &SlowConfig) -> Result<Self, ConfigError> {
        let p = Self::prefix();
        let defaults = ServerConfig::default();
        let addr = match config.get_or::<Option<String>>(&key(p, "addr"), None)? {
            Some(raw) => raw.parse().map_err(|_| ConfigError::TypeMismatch {
                key: key(p, "addr"),
                expected: "socket address",
            })?,
            None => defaults.addr,
        };
        Ok(ServerConfig {
            addr,
            request_timeout: Duration::from_millis(config.get_or(
                &key(p, "request_timeout_ms"),
                defaults.request_timeout.as_millis() as u64,
            )?),
            shutdown_grace: Duration::from_secs(config.get_or(
                &key(p, "shutdown_grace_secs"),
                defaults.shutdown_grace.as_secs(),
            )?),
        })
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings under `log.*`.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl ConfigProperties for LogConfig {
    fn prefix() -> &'static str {
        "log"
    }

    fn from_config(config: &SlowConfig) -> Result<Self, ConfigError> {
        let raw: String = config.get_or(&key(Self::prefix(), "format"), "text".to_string())?;
        let format = match raw.to_lowercase().as_str() {
            "text" | "pretty" => LogFormat::Text,
            "json" => LogFormat::Json,
            _ => {
                return Err(ConfigError::TypeMismatch {
                    key: key(Self::prefix(), "format"),
                    expected: "\"text\" or \"json\"",
                })
            }
        };
        Ok(LogConfig { format })
    }
}
