use std::collections::HashMap;
use std::path::Path;

use super::value::ConfigValue;
use super::ConfigError;

/// Merge a YAML file into `values`. A missing file is not an error.
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
}

pub(crate) fn load_yaml_str(
    content: &str,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), ConfigError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    flatten_yaml("", &yaml, values);
    Ok(())
}

/// Flatten a YAML tree into dot-separated keys (`rowmap.database.url`).
///
/// Sequences are stored whole under their key.
fn flatten_yaml(prefix: &str, value: &serde_yaml::Value, out: &mut HashMap<String, ConfigValue>) {
    if let serde_yaml::Value::Mapping(map) = value {
        for (k, v) in map {
            let segment = match k {
                serde_yaml::Value::String(s) => s.clone(),
                other => format!("{other:?}"),
            };
            let key = if prefix.is_empty() {
                segment
            } else {
                format!("{prefix}.{segment}")
            };
            flatten_yaml(&key, v, out);
        }
    } else if !prefix.is_empty() {
        out.insert(prefix.to_string(), ConfigValue::from_yaml(value));
    }
}
