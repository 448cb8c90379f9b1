//! Credential loading from an optional `.env` file and the process environment.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::config::config_dir;

/// API keys available to the store and insight clients.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from a key-value map.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Returns a credential from the loaded file, if present and non-blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Returns a credential from the loaded file, then the process environment.
    pub fn resolve(&self, key: &str) -> Option<String> {
        self.resolve_with(key, |k| std::env::var(k).ok())
    }

    /// Like [`Credentials::resolve`] with a custom environment lookup.
    pub fn resolve_with(&self, key: &str, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.get(key)
            .map(str::to_owned)
            .or_else(|| env(key).filter(|value| !value.trim().is_empty()))
    }

    /// Returns a required credential or an error when missing.
    ///
    /// # Errors
    ///
    /// Returns an error when neither the file nor the environment has the key.
    pub fn require(&self, key: &str) -> anyhow::Result<String> {
        self.resolve(key)
            .ok_or_else(|| anyhow::anyhow!("missing required credential: {key}"))
    }
}

/// Load API keys from the `.env` file at `path`.
///
/// # Errors
///
/// Returns an error if the file is missing, readable by group or others, or
/// holds a line that is not `KEY=value`.
pub fn load_credentials(path: &Path) -> anyhow::Result<Credentials> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("no API key file at {}", path.display()))?;
    ensure_owner_only(path, &metadata)?;

    let vars = dotenvy::from_path_iter(path)
        .with_context(|| format!("cannot open API key file {}", path.display()))?
        .collect::<Result<BTreeMap<_, _>, _>>()
        .with_context(|| format!("malformed line in API key file {}", path.display()))?;

    debug!(path = %path.display(), keys = vars.len(), "API key file loaded");
    Ok(Credentials { vars })
}

/// Load credentials from `~/.secret-friend/.env` when it exists.
///
/// A missing file is not an error: keys then come from the environment.
///
/// # Errors
///
/// Returns an error when the home directory cannot be resolved or the file
/// exists but is invalid.
pub fn load_default_credentials() -> anyhow::Result<Credentials> {
    let path = config_dir()?.join(".env");
    if !path.exists() {
        debug!(path = %path.display(), "no credentials file, using environment only");
        return Ok(Credentials::default());
    }
    load_credentials(&path)
}

#[cfg(unix)]
fn ensure_owner_only(path: &Path, metadata: &fs::Metadata) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode() & 0o777;
    anyhow::ensure!(
        mode & 0o077 == 0,
        "API key file {} is mode {mode:o}; restrict it with `chmod 0600`",
        path.display()
    );
    Ok(())
}

#[cfg(not(unix))]
fn ensure_owner_only(_path: &Path, _metadata: &fs::Metadata) -> anyhow::Result<()> {
    Ok(())
}
