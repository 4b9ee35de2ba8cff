//! Loading configuration files from disk.

use portcullis_config::{
    ConfigError, ConfigLoader, LogFormat, PortcullisConfig, SessionStoreKind, TokenTrim,
};
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

fn write_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_complete_toml_file() {
    let file = write_file(
        ".toml",
        r#"
            [authorization]
            role_attributes = ["groups", "extra_groups"]
            permission_attributes = ["scopes"]
            delimiter = ", "
            trim = "whitespace"
            default_roles = ["user"]
            default_permissions = ["profile:read"]

            [session]
            store = "cookie"
            data_cookie_name = "APP_DATA"
            cookie_path = "/app"
            cookie_domain = "example.com"

            [logging]
            enabled = true
            level = "warn"
            format = "pretty"
        "#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.authorization.role_attributes, ["groups", "extra_groups"]);
    assert_eq!(config.authorization.delimiter, ", ");
    assert_eq!(config.authorization.trim, TokenTrim::Whitespace);
    assert_eq!(config.authorization.default_permissions, ["profile:read"]);
    assert_eq!(config.session.store, SessionStoreKind::Cookie);
    assert_eq!(config.session.cookie_domain.as_deref(), Some("example.com"));
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn test_json_file() {
    let file = write_file(".json", r#"{"authorization": {"role_attributes": ["roles"]}}"#);
    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.authorization.role_attributes, ["roles"]);
    assert_eq!(config.session, PortcullisConfig::default().session);
}

#[test]
fn test_optional_file_present() {
    let file = write_file(".toml", "[logging]\nlevel = \"trace\"\n");
    let config = ConfigLoader::new()
        .with_optional_file(file.path())
        .unwrap()
        .load()
        .unwrap();
    assert_eq!(config.logging.level, "trace");
}

#[test]
fn test_unsupported_extension() {
    let file = write_file(".yaml", "logging: {}\n");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_malformed_file() {
    let file = write_file(".toml", "[session\nstore = ");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

#[test]
fn test_unknown_field_in_file() {
    let file = write_file(".toml", "[session]\nsecret = \"x\"\n");
    assert!(ConfigLoader::new().with_file(file.path()).is_err());
}

#[test]
fn test_invalid_value_in_file_fails_on_load() {
    let file = write_file(".toml", "[session]\ncookie_name = \"bad name\"\n");
    let loader = ConfigLoader::new().with_file(file.path()).unwrap();
    let err = loader.load().unwrap_err();
    assert!(err.is_invalid_value());
}

#[test]
fn test_file_replaces_preset() {
    let file = write_file(".toml", "[session]\nmax_inactive_secs = 120\n");
    let config = ConfigLoader::new()
        .with_development()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.session.max_inactive_secs, 120);
    assert_eq!(config.logging.format, LogFormat::Json);
}
