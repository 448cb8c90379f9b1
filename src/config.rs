//! Configuration loading and validation.
//!
//! Secret Friend reads a single human-owned `config.toml`. Secrets never live
//! in it: each section names the environment variable holding its key, which
//! is resolved through [`crate::credentials`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::insights::gemini::{DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL};
use crate::store::rest::WriteColumns;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Remote participant table.
    pub store: StoreConfig,

    /// Draw workflow settings.
    #[serde(default)]
    pub draw: DrawConfig,

    /// Insight generation settings.
    #[serde(default)]
    pub insights: InsightsConfig,
}

/// Remote participant table settings.
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Project base URL (e.g. "https://abc.supabase.co").
    pub url: String,

    /// Table holding the participants.
    #[serde(default = "default_table")]
    pub table: String,

    /// Environment variable name holding the store API key.
    #[serde(default = "default_store_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds.
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,

    /// Identifier columns tried in order when writing.
    #[serde(default = "default_id_columns")]
    pub id_columns: Vec<String>,

    /// Column receiving the drawn recipient's name.
    #[serde(default = "default_recipient_column")]
    pub recipient_column: String,

    /// Column receiving the drawn flag.
    #[serde(default = "default_drawn_column")]
    pub drawn_column: String,
}

impl StoreConfig {
    /// Column names for assignment writes.
    pub fn write_columns(&self) -> WriteColumns {
        WriteColumns {
            id_columns: self.id_columns.clone(),
            recipient: self.recipient_column.clone(),
            drawn: self.drawn_column.clone(),
        }
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Draw workflow settings.
#[derive(Debug, Deserialize)]
pub struct DrawConfig {
    /// Redraws allowed when the confirmed recipient was claimed concurrently.
    #[serde(default = "default_max_redraw_attempts")]
    pub max_redraw_attempts: u32,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            max_redraw_attempts: default_max_redraw_attempts(),
        }
    }
}

/// Insight generation settings.
#[derive(Debug, Deserialize)]
pub struct InsightsConfig {
    /// Whether insights are requested at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Gemini model name.
    #[serde(default = "default_insights_model")]
    pub model: String,

    /// Gemini API base URL.
    #[serde(default = "default_insights_url")]
    pub base_url: String,

    /// Environment variable name holding the Gemini API key.
    #[serde(default = "default_insights_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds.
    #[serde(default = "default_insights_timeout")]
    pub timeout_secs: u64,
}

impl InsightsConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_insights_model(),
            base_url: default_insights_url(),
            api_key_env: default_insights_key_env(),
            timeout_secs: default_insights_timeout(),
        }
    }
}

// Default value functions for serde

fn default_table() -> String {
    "friends".to_owned()
}
fn default_store_key_env() -> String {
    "SECRET_FRIEND_STORE_KEY".to_owned()
}
fn default_store_timeout() -> u64 {
    15
}
fn default_id_columns() -> Vec<String> {
    WriteColumns::default().id_columns
}
fn default_recipient_column() -> String {
    WriteColumns::default().recipient
}
fn default_drawn_column() -> String {
    WriteColumns::default().drawn
}
fn default_max_redraw_attempts() -> u32 {
    3
}
fn default_true() -> bool {
    true
}
fn default_insights_model() -> String {
    DEFAULT_GEMINI_MODEL.to_owned()
}
fn default_insights_url() -> String {
    DEFAULT_GEMINI_URL.to_owned()
}
fn default_insights_key_env() -> String {
    "GEMINI_API_KEY".to_owned()
}
fn default_insights_timeout() -> u64 {
    30
}

/// Parse and validate configuration from TOML text.
///
/// # Errors
///
/// Returns an error if the text is not valid TOML for [`Config`] or fails
/// validation.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    validate(&config)?;
    Ok(config)
}

/// Load the config from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config at {}: {e}", path.display()))?;
    parse_config(&contents)
        .map_err(|e| anyhow::anyhow!("invalid config at {}: {e}", path.display()))
}

fn validate(config: &Config) -> anyhow::Result<()> {
    let url = url::Url::parse(&config.store.url)
        .map_err(|e| anyhow::anyhow!("store.url {:?} is not a valid URL: {e}", config.store.url))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("store.url must use http or https, got {:?}", url.scheme());
    }
    if config.store.table.trim().is_empty() {
        anyhow::bail!("store.table must not be empty");
    }
    if config.store.id_columns.is_empty() {
        anyhow::bail!("store.id_columns must name at least one column");
    }
    Ok(())
}

/// Resolve the default config directory (`~/.secret-friend/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".secret-friend"))
}

/// Default config file path (`~/.secret-friend/config.toml`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}
