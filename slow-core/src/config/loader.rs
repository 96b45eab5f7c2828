use std::collections::HashMap;
use std::path::Path;

use super::value::ConfigValue;
use super::ConfigError;

/// Load and parse a YAML file, flattening it into the values map. Missing files are skipped.
pub(crate) fn load_yaml_file(
    path: &Path,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    if !path.exists() {
        return Ok(());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
    load_yaml_str(&content, values)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))
}

/// Parse a YAML string and flatten it into the values map.
pub(crate) fn load_yaml_str(
    content: &str,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    flatten_yaml("", &yaml, values);
    Ok(())
}

/// Flatten a YAML tree into dot-separated keys; sequences are stored whole.
pub(crate) fn flatten_yaml(
    prefix: &str,
    value: &serde_yaml::Value,
    out: &mut HashMap<String, ConfigValue>,
) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let segment = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => format!("{other:?}"),
                };
                let full_key = if prefix.is_empty() {
                    segment
                } else {
                    format!("{prefix}.{segment}")
                };
                flatten_yaml(&full_key, v, out);
            }
        }
        leaf => {
            if !prefix.is_empty() {
                out.insert(prefix.to_string(), ConfigValue::from_yaml(leaf));
            }
        }
    }
}

/// Overlay prefixed environment variables: `SLOW_DATABASE__HOST` -> `database.host`.
pub(crate) fn overlay_env(
    vars: impl IntoIterator<Item = (String, String)>,
    prefix: &str,
    out: &mut HashMap<String, ConfigValue>,
) {
    for (env_key, env_val) in vars {
        let Some(rest) = env_key.strip_prefix(prefix) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        let key = rest.to_lowercase().replace("__", ".");
        out.insert(key, ConfigValue::String(env_val));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overlay_maps_double_underscore_to_dot() {
        let mut values = HashMap::new();
        overlay_env(
            vec![
                ("SLOW_DATABASE__HOST".to_string(), "db.internal".to_string()),
                ("SLOW_DATABASE__MAX_CONNECTIONS".to_string(), "32".to_string()),
                ("PATH".to_string(), "/usr/bin".to_string()),
                ("SLOW_".to_string(), "ignored".to_string()),
            ],
            "SLOW_",
            &mut values,
        );
        assert_eq!(values.len(), 2);
        assert!(matches!(
            values.get("database.host"),
            Some(ConfigValue::String(s)) if s == "db.internal"
        ));
        assert!(values.contains_key("database.max_connections"));
    }

    #[test]
    fn flatten_nested_mapping() {
        let mut values = HashMap::new();
        load_yaml_str("database:\n  host: localhost\n  port: 3306\n", &mut values).unwrap();
        assert!(matches!(values.get("database.port"), Some(ConfigValue::Integer(3306))));
    }
}
