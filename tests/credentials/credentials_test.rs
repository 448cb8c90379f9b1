//! Coverage for credential loading and permission checks.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use secret_friend::credentials::{load_credentials, Credentials};

fn write_env(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join(".env");
    fs::write(&path, contents).expect("write .env");
    path
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).expect("set permissions");
}

#[cfg(unix)]
#[test]
fn loads_private_env_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_env(
        dir.path(),
        "SECRET_FRIEND_STORE_KEY=sb_secret_abc\nGEMINI_API_KEY=AIza123\n",
    );
    set_mode(&path, 0o600);

    let credentials = load_credentials(&path).expect("credentials should load");
    assert_eq!(credentials.get("SECRET_FRIEND_STORE_KEY"), Some("sb_secret_abc"));
    assert_eq!(credentials.get("GEMINI_API_KEY"), Some("AIza123"));
}

#[cfg(unix)]
#[test]
fn rejects_world_readable_env_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_env(dir.path(), "GEMINI_API_KEY=AIza123\n");
    set_mode(&path, 0o644);

    let err = load_credentials(&path).expect_err("0644 should be rejected");
    let message = err.to_string();
    assert!(message.contains("mode 644"));
    assert!(message.contains("chmod 0600"));
}

#[cfg(unix)]
#[test]
fn malformed_line_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_env(dir.path(), "GEMINI_API_KEY=AIza123
not a key line
");
    set_mode(&path, 0o600);

    let err = load_credentials(&path).expect_err("malformed line should fail");
    assert!(err.to_string().contains("malformed line in API key file"));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = load_credentials(&dir.path().join(".env")).expect_err("missing file");
    assert!(err.to_string().contains("no API key file"));
}

#[test]
fn file_values_win_over_environment() {
    let mut vars = BTreeMap::new();
    vars.insert("GEMINI_API_KEY".to_owned(), "from-file".to_owned());
    let credentials = Credentials::from_map(vars);

    let resolved = credentials.resolve_with("GEMINI_API_KEY", |_| Some("from-env".to_owned()));
    assert_eq!(resolved.as_deref(), Some("from-file"));
}

#[test]
fn environment_fills_missing_and_blank_values() {
    let mut vars = BTreeMap::new();
    vars.insert("SECRET_FRIEND_STORE_KEY".to_owned(), "   ".to_owned());
    let credentials = Credentials::from_map(vars);

    assert_eq!(credentials.get("SECRET_FRIEND_STORE_KEY"), None);
    let env = |key: &str| (key == "SECRET_FRIEND_STORE_KEY").then(|| "from-env".to_owned());
    assert_eq!(
        credentials.resolve_with("SECRET_FRIEND_STORE_KEY", env).as_deref(),
        Some("from-env")
    );
    assert_eq!(credentials.resolve_with("GEMINI_API_KEY", env), None);
    assert_eq!(
        credentials.resolve_with("GEMINI_API_KEY", |_| Some(String::new())),
        None
    );
}

#[test]
fn debug_output_redacts_values() {
    let mut vars = BTreeMap::new();
    vars.insert("GEMINI_API_KEY".to_owned(), "AIza-very-secret".to_owned());
    let rendered = format!("{:?}", Credentials::from_map(vars));

    assert!(rendered.contains("GEMINI_API_KEY"));
    assert!(!rendered.contains("AIza-very-secret"));
}
