//! CLI integration tests.
//!
//! These tests verify the CLI argument parsing and configuration loading.

use std::ffi::OsString;
use std::io::Write;
use tempfile::NamedTempFile;

use simple_chat::cli::{parse_args_from, Args};
use simple_chat::config::Config;

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("simple-chat")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.port.is_none());
    assert!(result.config.is_none());
    assert!(result.log_level.is_none());
    assert!(!result.help);
    assert!(!result.version);
}

#[test]
fn test_cli_port_and_options() {
    let result = parse_args_from(args(&["-c", "/etc/simple-chat.json", "-l", "debug", "8080"]))
        .unwrap();

    assert_eq!(result.port, Some(8080));
    assert_eq!(result.log_level, Some("debug".to_string()));
    assert_eq!(
        result.config.unwrap().to_str().unwrap(),
        "/etc/simple-chat.json"
    );
}

#[test]
fn test_cli_non_numeric_port_uses_default() {
    let result = parse_args_from(args(&["not-a-number"])).unwrap();
    assert!(result.port.is_none());

    let args = Args {
        log_level: Some("info".to_string()),
        ..result
    };
    let config = Config::load(&args).unwrap();
    if std::env::var("SIMPLE_CHAT_PORT").is_err() {
        assert_eq!(config.server.port, 5555);
    }
}

#[test]
fn test_cli_extra_positional() {
    assert!(parse_args_from(args(&["5555", "6666"])).is_err());
}

// ============================================================================
// Configuration Loading Tests
// ============================================================================

#[test]
fn test_config_from_json_file() {
    let json = r#"{
        "server": {
            "port": 9000
        },
        "logging": {
            "level": "debug"
        }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_config_priority_cli_over_file() {
    let json = r#"{
        "server": { "port": 5000 },
        "logging": { "level": "warn" }
    }"#;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let args = Args {
        port: Some(8080),
        log_level: Some("trace".to_string()),
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();

    // CLI values should win
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.log_filter(), "trace");
}

#[test]
fn test_config_file_port_without_cli_port() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{"server": {"port": 5001}}"#).unwrap();

    let args = Args {
        config: Some(file.path().to_path_buf()),
        ..Args::default()
    };

    let config = Config::load(&args).unwrap();
    if std::env::var("SIMPLE_CHAT_PORT").is_err() {
        assert_eq!(config.server.port, 5001);
    }
}

#[test]
fn test_config_missing_file_is_error() {
    let args = Args {
        config: Some("/nonexistent/simple-chat.json".into()),
        ..Args::default()
    };

    let err = Config::load(&args).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

// ============================================================================
// Configuration Serialization Tests
// ============================================================================

#[test]
fn test_config_roundtrip() {
    let original = Config::default();
    let json = serde_json::to_string(&original).unwrap();
    let loaded: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(original.server.port, loaded.server.port);
    assert_eq!(original.logging.level, loaded.logging.level);
}

#[test]
fn test_config_partial_deserialization() {
    let json = r#"{"server": {"port": 9999}}"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.server.port, 9999);
    assert_eq!(config.logging.level, "info"); // Default
}
