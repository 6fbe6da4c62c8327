mod loader;
pub mod database;
pub mod typed;
pub mod value;

use std::collections::HashMap;
use std::path::Path;

pub use database::DatabaseConfig;
pub use typed::ConfigProperties;
pub use value::{ConfigValue, FromConfigValue};

/// Environment variable selecting the active profile.
pub const PROFILE_ENV: &str = "ROWMAP_PROFILE";
const ENV_PREFIX: &str = "ROWMAP_";

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The requested key was not found in the configuration.
    NotFound(String),
    /// The value could not be converted to the requested type.
    TypeMismatch { key: String, expected: &'static str },
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Process configuration loaded once at start-up from YAML files, `.env`
/// files and `ROWMAP_*` environment variables.
///
/// Resolution order (lowest to highest priority):
/// 1. `application.yaml`
/// 2. `application-{profile}.yaml`
/// 3. `.env` then `.env.{profile}` (never overwrite variables already set)
/// 4. `ROWMAP_*` environment variables (`ROWMAP_DATABASE_URL` overrides
///    `rowmap.database.url`)
///
/// Keys are compared with `_` and `.` treated alike, so
/// `rowmap.database.create_if_missing` can be overridden from the environment.
/// The profile is `ROWMAP_PROFILE` if set, else the argument.
#[derive(Debug, Clone)]
pub struct RowmapConfig {
    values: HashMap<String, ConfigValue>,
    profile: String,
}

impl RowmapConfig {
    /// Load configuration for `profile` from the current working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), profile)
    }

    /// Load configuration for `profile`, reading files from `dir`.
    pub fn load_from(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        let profile = std::env::var(PROFILE_ENV).unwrap_or_else(|_| profile.to_string());
        let mut raw = HashMap::new();

        loader::load_yaml_file(&dir.join("application.yaml"), &mut raw)?;
        loader::load_yaml_file(&dir.join(format!("application-{profile}.yaml")), &mut raw)?;

        let _ = dotenvy::from_path(dir.join(".env"));
        let _ = dotenvy::from_path(dir.join(format!(".env.{profile}")));

        let mut config = RowmapConfig {
            values: HashMap::new(),
            profile,
        };
        for (key, value) in raw {
            config.set(&key, value);
        }
        for (env_key, env_val) in std::env::vars() {
            if env_key.starts_with(ENV_PREFIX) && env_key != PROFILE_ENV {
                config.set(&env_key, ConfigValue::String(env_val));
            }
        }
        tracing::debug!(profile = %config.profile, keys = config.values.len(), "configuration loaded");
        Ok(config)
    }

    /// Create a config from a YAML string, without touching the environment.
    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut raw = HashMap::new();
        loader::load_yaml_str(yaml, &mut raw)?;
        let mut config = RowmapConfig {
            values: HashMap::new(),
            profile: profile.to_string(),
        };
        for (key, value) in raw {
            config.set(&key, value);
        }
        Ok(config)
    }

    /// Create an empty config (useful for testing).
    pub fn empty() -> Self {
        RowmapConfig {
            values: HashMap::new(),
            profile: "test".to_string(),
        }
    }

    /// Set a value programmatically.
    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(normalize_key(key), value);
    }

    /// Get a typed value for the given dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the key does not exist, or
    /// `ConfigError::TypeMismatch` if the value cannot be converted.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .values
            .get(&normalize_key(key))
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    /// Get a typed value, returning `default` if the key is missing.
    ///
    /// A present value of the wrong type is still an error.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> Result<V, ConfigError> {
        match self.get(key) {
            Err(ConfigError::NotFound(_)) => Ok(default),
            other => other,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(&normalize_key(key))
    }

    /// The active profile name.
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Build a typed section from this config.
    pub fn section<C: ConfigProperties>(&self) -> Result<C, ConfigError> {
        C::from_config(self)
    }
}

fn normalize_key(key: &str) -> String {
    key.to_lowercase().replace('_', ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_ignore_case_and_separator() {
        let mut config = RowmapConfig::empty();
        config.set("ROWMAP_DATABASE_CREATE_IF_MISSING", ConfigValue::String("no".into()));
        assert!(!config.get::<bool>("rowmap.database.create_if_missing").unwrap());
        assert!(config.contains_key("rowmap.database.create.if.missing"));
    }

    #[test]
    fn test_get_or_keeps_type_errors() {
        let mut config = RowmapConfig::empty();
        config.set("rowmap.flag", ConfigValue::String("maybe".into()));
        assert!(config.get_or("rowmap.flag", true).is_err());
        assert!(config.get_or("rowmap.absent", true).unwrap());
    }
}
