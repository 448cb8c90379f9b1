//! Coverage for config parsing and validation.

use std::fs;
use std::time::Duration;

use secret_friend::config::{load_config, parse_config};

#[test]
fn parse_minimal_config() {
    let config = parse_config("[store]\nurl = \"https://abc.supabase.co\"\n")
        .expect("minimal config should parse");

    assert_eq!(config.store.url, "https://abc.supabase.co");
    assert_eq!(config.store.table, "friends");
    assert_eq!(config.store.api_key_env, "SECRET_FRIEND_STORE_KEY");
    assert_eq!(config.store.timeout(), Duration::from_secs(15));
    assert_eq!(config.draw.max_redraw_attempts, 3);
    assert!(config.insights.enabled);

    let columns = config.store.write_columns();
    assert_eq!(columns.id_columns, vec!["Id".to_owned(), "id".to_owned()]);
    assert_eq!(columns.recipient, "segredo");
    assert_eq!(columns.drawn, "temsegredo");
}

#[test]
fn parse_full_config() {
    let toml_str = r#"
[store]
url = "http://localhost:54321"
table = "amigos"
api_key_env = "AMIGOS_KEY"
timeout_secs = 5
id_columns = ["id"]
recipient_column = "assigned_recipient_name"
drawn_column = "has_drawn"

[draw]
max_redraw_attempts = 0

[insights]
enabled = false
model = "gemini-2.5-flash"
base_url = "http://localhost:9999"
api_key_env = "MY_GEMINI"
timeout_secs = 7
"#;
    let config = parse_config(toml_str).expect("full config should parse");

    assert_eq!(config.store.table, "amigos");
    assert_eq!(config.store.api_key_env, "AMIGOS_KEY");
    assert_eq!(config.store.timeout(), Duration::from_secs(5));
    let columns = config.store.write_columns();
    assert_eq!(columns.id_columns, vec!["id".to_owned()]);
    assert_eq!(columns.recipient, "assigned_recipient_name");
    assert_eq!(columns.drawn, "has_drawn");

    assert_eq!(config.draw.max_redraw_attempts, 0);

    assert!(!config.insights.enabled);
    assert_eq!(config.insights.model, "gemini-2.5-flash");
    assert_eq!(config.insights.base_url, "http://localhost:9999");
    assert_eq!(config.insights.api_key_env, "MY_GEMINI");
    assert_eq!(config.insights.timeout(), Duration::from_secs(7));
}

#[test]
fn store_section_is_required() {
    assert!(parse_config("[draw]\nmax_redraw_attempts = 1\n").is_err());
}

#[test]
fn rejects_invalid_store_url() {
    assert!(parse_config("[store]\nurl = \"not a url\"\n").is_err());
}

#[test]
fn rejects_empty_table() {
    let result = parse_config("[store]\nurl = \"https://abc.supabase.co\"\ntable = \"  \"\n");
    assert!(result.is_err());
}

#[test]
fn rejects_empty_id_columns() {
    let result = parse_config("[store]\nurl = \"https://abc.supabase.co\"\nid_columns = []\n");
    let err = result.expect_err("empty id_columns should be rejected");
    assert!(err.to_string().contains("id_columns"));
}

#[test]
fn load_config_reads_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "[store]\nurl = \"https://abc.supabase.co\"\ntable = \"t\"\n")
        .expect("write config");

    let config = load_config(&path).expect("config should load");
    assert_eq!(config.store.table, "t");
}

#[test]
fn load_config_reports_path_on_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("missing.toml");
    let err = load_config(&missing).expect_err("missing file should fail");
    assert!(err.to_string().contains("missing.toml"));

    let invalid = dir.path().join("invalid.toml");
    fs::write(&invalid, "[store\n").expect("write config");
    let err = load_config(&invalid).expect_err("invalid TOML should fail");
    assert!(err.to_string().contains("invalid config"));
}
