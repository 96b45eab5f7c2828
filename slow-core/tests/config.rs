use std::time::Duration;

use serial_test::serial;
use slow_core::config::{
    ConfigError, ConfigValue, DatabaseConfig, LogConfig, LogFormat, ServerConfig, SlowConfig,
};

#[test]
fn test_empty_config() {
    let config = SlowConfig::empty();
    assert!(matches!(
        config.get::<String>("nonexistent"),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn test_set_and_get() {
    let mut config = SlowConfig::empty();
    config.set("app.name", ConfigValue::String("test".into()));
    assert_eq!(config.get::<String>("app.name").unwrap(), "test");
    assert!(config.contains_key("app.name"));
}

#[test]
fn test_get_or_default_only_when_missing() {
    let mut config = SlowConfig::empty();
    assert_eq!(config.get_or("missing", 42i64).unwrap(), 42);
    config.set("bad", ConfigValue::String("forty".into()));
    assert!(config.get_or("bad", 42i64).is_err());
}

#[test]
fn test_flatten_yaml() {
    let yaml = r#"
database:
  host: "127.0.0.1"
  port: 3306
  name: "petrol"
  user: "root"
  password: "secret"
"#;
    let config = SlowConfig::from_yaml_str(yaml, "test").unwrap();
    assert_eq!(config.get::<String>("database.host").unwrap(), "127.0.0.1");
    assert_eq!(config.get::<u16>("database.port").unwrap(), 3306);
    assert_eq!(config.profile(), "test");
}

#[test]
fn database_section_defaults() {
    let yaml = r#"
database:
  host: db
  name: petrol
  user: app
"#;
    let config = SlowConfig::from_yaml_str(yaml, "test").unwrap();
    let db: DatabaseConfig = config.section().unwrap();
    assert_eq!(db.port, 3306);
    assert_eq!(db.password, "");
    assert_eq!(db.max_connections, 10);
    assert_eq!(db.min_connections, 0);
    assert_eq!(db.acquire_timeout, Duration::from_millis(3000));
    assert_eq!(db.idle_timeout, Duration::from_secs(600));
    assert_eq!(db.slow_threshold, Duration::from_secs(1));
}

#[test]
fn database_section_requires_host_without_url() {
    let config = SlowConfig::from_yaml_str("database:\n  name: petrol\n  user: app\n", "test").unwrap();
    let err = config.section::<DatabaseConfig>().unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(key) if key == "database.host"));
}

#[test]
fn database_section_url_replaces_discrete_fields() {
    let config = SlowConfig::from_yaml_str("database:\n  url: \"sqlite::memory:\"\n", "test").unwrap();
    let db: DatabaseConfig = config.section().unwrap();
    assert_eq!(db.url.as_deref(), Some("sqlite::memory:"));
}

#[test]
fn database_debug_redacts_password() {
    let yaml = "database:\n  host: db\n  name: n\n  user: u\n  password: hunter2\n";
    let config = SlowConfig::from_yaml_str(yaml, "test").unwrap();
    let db: DatabaseConfig = config.section().unwrap();
    assert!(!format!("{db:?}").contains("hunter2"));
}

#[test]
fn min_connections_above_max_is_rejected() {
    let yaml = "database:\n  url: x\n  max_connections: 2\n  min_connections: 5\n";
    let config = SlowConfig::from_yaml_str(yaml, "test").unwrap();
    assert!(config.section::<DatabaseConfig>().is_err());
}

#[test]
fn server_section_defaults() {
    let server: ServerConfig = SlowConfig::empty().section().unwrap();
    assert_eq!(server.addr.port(), 1323);
    assert_eq!(server.request_timeout, Duration::from_secs(5));
    assert_eq!(server.shutdown_grace, Duration::from_secs(10));
}

#[test]
fn server_section_rejects_bad_addr() {
    let config = SlowConfig::from_yaml_str("server:\n  addr: not-an-addr\n", "test").unwrap();
    assert!(matches!(
        config.section::<ServerConfig>(),
        Err(ConfigError::TypeMismatch { .. })
    ));
}

#[test]
fn log_section_format() {
    let config = SlowConfig::from_yaml_str("log:\n  format: json\n", "test").unwrap();
    assert_eq!(config.section::<LogConfig>().unwrap().format, LogFormat::Json);
    assert_eq!(
        SlowConfig::empty().section::<LogConfig>().unwrap().format,
        LogFormat::Text
    );
}

#[test]
#[serial]
fn load_layers_profile_file_and_env() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("application.yaml"),
        "database:\n  host: base\n  port: 3306\n  name: petrol\n  user: app\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("application-prod.yaml"),
        "database:\n  host: prod-db\n",
    )
    .unwrap();
    std::fs::write(dir.path().join(".env.prod"), "SLOW_DATABASE__PORT=3307\n").unwrap();

    std::env::remove_var("SLOW_PROFILE");
    std::env::set_var("SLOW_DATABASE__NAME", "from_env");

    let config = SlowConfig::load_from(dir.path(), "prod").unwrap();
    std::env::remove_var("SLOW_DATABASE__NAME");
    std::env::remove_var("SLOW_DATABASE__PORT");

    assert_eq!(config.profile(), "prod");
    let db: DatabaseConfig = config.section().unwrap();
    assert_eq!(db.host, "prod-db");
    assert_eq!(db.port, 3307);
    assert_eq!(db.name, "from_env");
    assert_eq!(db.user, "app");
}

#[test]
#[serial]
fn profile_env_var_wins_over_argument() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("SLOW_PROFILE", "staging");
    let config = SlowConfig::load_from(dir.path(), "dev").unwrap();
    std::env::remove_var("SLOW_PROFILE");
    assert_eq!(config.profile(), "staging");
}

#[test]
#[serial]
fn malformed_yaml_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("application.yaml"), "database: [unclosed\n").unwrap();
    std::env::remove_var("SLOW_PROFILE");
    assert!(matches!(
        SlowConfig::load_from(dir.path(), "dev"),
        Err(ConfigError::Load(_))
    ));
}
