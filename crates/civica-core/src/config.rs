use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the project state directory.
pub const CIVICA_DIR: &str = ".civica";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the remote issues API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Dashboard refresh cadence in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://jsonplaceholder.typicode.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_interval_secs() -> u64 {
    5
}

/// Walk ancestors of `start` looking for a `.civica` directory.
#[must_use]
pub fn find_civica_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CIVICA_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load `config.toml` from the `.civica` directory. A missing file means
/// defaults; a malformed file is a real error.
pub fn load_project_config(civica_dir: &Path) -> Result<ProjectConfig> {
    let path = civica_dir.join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Create the `.civica` directory (with `state/` and a default
/// `config.toml`) under `root`. Idempotent.
pub fn init_project(root: &Path) -> Result<PathBuf> {
    let civica_dir = root.join(CIVICA_DIR);
    std::fs::create_dir_all(civica_dir.join("state"))
        .with_context(|| format!("Failed to create {}", civica_dir.display()))?;

    let config_path = civica_dir.join("config.toml");
    if !config_path.exists() {
        let rendered = toml::to_string_pretty(&ProjectConfig::default())
            .context("Failed to render default config")?;
        std::fs::write(&config_path, rendered)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
    }

    Ok(civica_dir)
}
