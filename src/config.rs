use anyhow::{Context, Result};
use std::path::PathBuf;

pub(crate) const DB_VAR: &str = "SALDO_DB";
pub(crate) const USER_VAR: &str = "SALDO_USER";
pub(crate) const LOG_VAR: &str = "SALDO_LOG";

const DEFAULT_LOG_FILTER: &str = "saldo=warn";

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) db_path: PathBuf,
    /// External id of the acting user. Signing in happens at the identity
    /// provider, so the CLI only needs to know who it is acting for.
    pub(crate) user_id: Option<String>,
    pub(crate) log_filter: String,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = match non_empty(DB_VAR) {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        Ok(Self {
            db_path,
            user_id: non_empty(USER_VAR),
            log_filter: non_empty(LOG_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    pub(crate) fn require_user_id(&self) -> Result<&str> {
        self.user_id
            .as_deref()
            .with_context(|| format!("No user selected. Set {USER_VAR} to your user id"))
    }
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "saldo", "Saldo")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("saldo.db"))
}
