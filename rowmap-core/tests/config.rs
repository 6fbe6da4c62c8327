use rowmap_core::config::{ConfigError, ConfigProperties, ConfigValue, DatabaseConfig, RowmapConfig};
use serial_test::serial;
use std::fs;

#[test]
fn test_empty_config() {
    let config = RowmapConfig::empty();
    assert!(matches!(
        config.get::<String>("rowmap.database.url"),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn test_type_conversions() {
    let mut config = RowmapConfig::empty();
    config.set("int_val", ConfigValue::Integer(42));
    config.set("float_val", ConfigValue::Float(2.5));
    config.set("bool_val", ConfigValue::Bool(true));
    config.set("null_val", ConfigValue::Null);

    assert_eq!(config.get::<i64>("int_val").unwrap(), 42);
    assert_eq!(config.get::<u32>("int_val").unwrap(), 42);
    assert_eq!(config.get::<f64>("float_val").unwrap(), 2.5);
    assert!(config.get::<bool>("bool_val").unwrap());
    assert_eq!(config.get::<String>("int_val").unwrap(), "42");
    assert!(config.get::<Option<String>>("null_val").unwrap().is_none());
    assert!(matches!(
        config.get::<i64>("bool_val"),
        Err(ConfigError::TypeMismatch { expected: "i64", .. })
    ));
}

#[test]
fn test_flatten_yaml() {
    let yaml = r#"
rowmap:
  database:
    url: "sqlite::memory:"
    create_if_missing: false
  batch: [1, 2, 3]
"#;
    let config = RowmapConfig::from_yaml_str(yaml, "test").unwrap();
    assert_eq!(config.get::<String>("rowmap.database.url").unwrap(), "sqlite::memory:");
    assert!(!config.get::<bool>("rowmap.database.create_if_missing").unwrap());
    assert_eq!(config.get::<Vec<i64>>("rowmap.batch").unwrap(), vec![1, 2, 3]);
}

#[test]
fn test_invalid_yaml_is_a_load_error() {
    let err = RowmapConfig::from_yaml_str("rowmap: [unclosed", "test").unwrap_err();
    assert!(matches!(err, ConfigError::Load(_)));
}

#[test]
fn test_database_section_defaults() {
    let config = RowmapConfig::from_yaml_str("rowmap:\n  database:\n    url: sqlite:catalog.db\n", "test").unwrap();
    let db: DatabaseConfig = config.section().unwrap();
    assert_eq!(db, DatabaseConfig::new("sqlite:catalog.db"));
    assert_eq!(db.user, "SYSDBA");
    assert_eq!(db.password, "masterkey");
    assert_eq!(db.dialect, "sqlite");
    assert!(db.create_if_missing);
}

#[test]
fn test_database_section_requires_url() {
    let err = DatabaseConfig::from_config(&RowmapConfig::empty()).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(key) if key == "rowmap.database.url"));
}

#[test]
#[serial]
fn test_profile_file_overrides_base() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("application.yaml"),
        "rowmap:\n  database:\n    url: sqlite:base.db\n    user: reader\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("application-prod.yaml"),
        "rowmap:\n  database:\n    url: sqlite:prod.db\n",
    )
    .unwrap();

    let config = RowmapConfig::load_from(dir.path(), "prod").unwrap();
    assert_eq!(config.profile(), "prod");
    let db: DatabaseConfig = config.section().unwrap();
    assert_eq!(db.url, "sqlite:prod.db");
    assert_eq!(db.user, "reader");
}

#[test]
#[serial]
fn test_missing_files_yield_empty_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = RowmapConfig::load_from(dir.path(), "dev").unwrap();
    assert!(!config.contains_key("rowmap.database.url"));
}

#[test]
#[serial]
fn test_environment_overrides_yaml() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("application.yaml"),
        "rowmap:\n  database:\n    url: sqlite:file.db\n    create_if_missing: true\n",
    )
    .unwrap();

    std::env::set_var("ROWMAP_DATABASE_URL", "sqlite::memory:");
    std::env::set_var("ROWMAP_DATABASE_CREATE_IF_MISSING", "false");
    let loaded = RowmapConfig::load_from(dir.path(), "dev");
    std::env::remove_var("ROWMAP_DATABASE_URL");
    std::env::remove_var("ROWMAP_DATABASE_CREATE_IF_MISSING");

    let db: DatabaseConfig = loaded.unwrap().section().unwrap();
    assert_eq!(db.url, "sqlite::memory:");
    assert!(!db.create_if_missing);
}

#[test]
#[serial]
fn test_profile_env_wins_over_argument() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("application-ci.yaml"),
        "rowmap:\n  database:\n    url: sqlite:ci.db\n",
    )
    .unwrap();

    std::env::set_var("ROWMAP_PROFILE", "ci");
    let loaded = RowmapConfig::load_from(dir.path(), "dev");
    std::env::remove_var("ROWMAP_PROFILE");

    let config = loaded.unwrap();
    assert_eq!(config.profile(), "ci");
    assert_eq!(config.get::<String>("rowmap.database.url").unwrap(), "sqlite:ci.db");
}

#[test]
#[serial]
fn test_dotenv_file_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".env"), "ROWMAP_DATABASE_PASSWORD=from-dotenv\n").unwrap();

    let loaded = RowmapConfig::load_from(dir.path(), "dev");
    std::env::remove_var("ROWMAP_DATABASE_PASSWORD");

    assert_eq!(
        loaded.unwrap().get::<String>("rowmap.database.password").unwrap(),
        "from-dotenv"
    );
}
