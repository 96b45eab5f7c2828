use super::{ConfigError, SlowConfig};

/// Strongly-typed configuration section rooted at a key prefix.
///
/// ```ignore
/// impl ConfigProperties for DatabaseConfig {
///     fn prefix() -> &'static str { "database" }
///     fn from_config(config: &SlowConfig) -> Result<Self, ConfigError> {
///         let p = Self::prefix();
///         Ok(DatabaseConfig { host: config.get(&key(p, "host"))?, .. })
///     }
/// }
/// ```
pub trait ConfigProperties: Sized {
    /// The configuration key prefix (e.g. `"database"`).
    fn prefix() -> &'static str;

    /// Construct from a loaded [`SlowConfig`].
    fn from_config(config: &SlowConfig) -> Result<Self, ConfigError>;
}

/// Join a section prefix and a relative key.
pub fn key(prefix: &str, name: &str) -> String {
    format!("{prefix}.{name}")
}
