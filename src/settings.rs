use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};

const DEFAULT_DB_PATH: &str = "tally.db";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub remote: RemoteSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_environment() -> String {
    "sandbox".to_string()
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            client_id: String::new(),
            client_secret: String::new(),
            environment: default_environment(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
        }
    }
}

impl Settings {
    pub fn is_sandbox(&self) -> bool {
        self.remote.environment == "sandbox"
    }
}

fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("tally.toml")];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join("tally").join("config.toml"));
    }
    paths
}

fn find_config_file() -> Option<PathBuf> {
    config_paths().into_iter().find(|p| p.exists())
}

/// Load settings from the given path, or the first default location that
/// exists, falling back to defaults. Environment variables override file
/// values; a relative database path resolves against the config file's
/// directory.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let path = explicit.map(PathBuf::from).or_else(find_config_file);
    let mut settings = match &path {
        Some(p) if p.exists() => {
            let content = std::fs::read_to_string(p)?;
            toml::from_str(&content).map_err(|e| TallyError::Config(e.to_string()))?
        }
        Some(p) => {
            return Err(TallyError::Config(format!(
                "config file not found: {}",
                p.display()
            )))
        }
        None => Settings::default(),
    };
    apply_env_overrides(&mut settings);
    settings.database.path = resolve_db_path(&settings.database.path, path.as_deref())
        .to_string_lossy()
        .to_string();
    Ok(settings)
}

fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(v) = std::env::var("TALLY_CLIENT_ID") {
        settings.remote.client_id = v;
    }
    if let Ok(v) = std::env::var("TALLY_CLIENT_SECRET") {
        settings.remote.client_secret = v;
    }
    if let Ok(v) = std::env::var("TALLY_ENVIRONMENT") {
        settings.remote.environment = v;
    }
    if let Ok(v) = std::env::var("TALLY_DB_PATH") {
        settings.database.path = v;
    }
}

fn resolve_db_path(db_path: &str, config_path: Option<&Path>) -> PathBuf {
    let path = PathBuf::from(db_path);
    if path.is_absolute() {
        return path;
    }
    match config_path.and_then(|p| p.parent()) {
        Some(dir) => dir.join(path),
        None => path,
    }
}
