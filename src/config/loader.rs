use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "searchdeck.json";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub data_dir: Option<String>,
    pub env: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct DeckConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub health_path: Option<String>,
    pub data_dir: Option<String>,
    pub probe_interval_secs: Option<u64>,
    pub env: Option<String>,
    pub default_profile: Option<String>,
    pub profiles: HashMap<String, ProfileConfig>,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: DeckConfig,
    pub path: PathBuf,
    pub dir: PathBuf,
}

/// Loads `searchdeck.json` from `target`, which may be the file itself or its directory.
///
/// Returns `Ok(None)` when no config file exists.
pub fn load_config(target: &Path) -> Result<Option<LoadedConfig>> {
    let resolved = if target.is_absolute() {
        target.to_path_buf()
    } else {
        std::env::current_dir()?.join(target)
    };

    let (file_path, dir) = if resolved.is_dir() {
        (resolved.join(CONFIG_FILE_NAME), resolved)
    } else {
        let dir = match resolved.parent() {
            Some(parent) => parent.to_path_buf(),
            None => std::env::current_dir()?,
        };
        (resolved, dir)
    };

    if !file_path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&file_path)
        .with_context(|| format!("reading config {}", file_path.display()))?;

    let config: DeckConfig = serde_json::from_str(&contents)
        .with_context(|| format!("parsing config {}", file_path.display()))?;

    Ok(Some(LoadedConfig {
        config,
        path: file_path,
        dir,
    }))
}
