use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Result};

use crate::executor::{Executor, DEFAULT_HEALTH_PATH};

use super::env_file::{load_env_file, EnvMap};
use super::loader::{DeckConfig, LoadedConfig, ProfileConfig};

pub const DEFAULT_BASE_URL: &str = "http://localhost:7700";
pub const DEFAULT_API_KEY: &str = "your-secure-16-byte-master-key";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(10);

pub const BASE_URL_VAR: &str = "SEARCHDECK_BASE_URL";
pub const API_KEY_VAR: &str = "SEARCHDECK_API_KEY";

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub api_key: String,
    pub health_path: String,
    pub data_dir: PathBuf,
    pub probe_interval: Duration,
    pub profile_name: Option<String>,
    pub env_files: Vec<PathBuf>,
}

impl Settings {
    pub fn executor(&self) -> Executor {
        Executor::new(self.base_url.clone(), self.api_key.clone())
            .with_health_path(self.health_path.clone())
    }
}

/// Layers defaults, config file, profile, env file and explicit overrides.
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    config_dir: PathBuf,
    config: Option<LoadedConfig>,
    requested_profile: Option<String>,
    explicit_env: Option<PathBuf>,
    base_url: Option<String>,
    api_key: Option<String>,
    data_dir: Option<PathBuf>,
}

impl SettingsBuilder {
    pub fn new(config_dir: PathBuf, config: Option<LoadedConfig>) -> Self {
        Self {
            config_dir,
            config,
            ..Self::default()
        }
    }

    pub fn profile(mut self, profile: Option<String>) -> Self {
        self.requested_profile = profile;
        self
    }

    pub fn env_file(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_env = path;
        self
    }

    pub fn base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        self.data_dir = data_dir;
        self
    }

    pub fn build(&self) -> Result<Settings> {
        let empty = DeckConfig::default();
        let config = self.config.as_ref().map(|c| &c.config).unwrap_or(&empty);
        let config_dir = self
            .config
            .as_ref()
            .map(|c| c.dir.as_path())
            .unwrap_or(self.config_dir.as_path());

        let profile = resolve_profile(config, self.requested_profile.as_deref())?;
        let profile_config = profile.as_ref().map(|p| p.config);

        let mut base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut api_key = config
            .api_key
            .clone()
            .unwrap_or_else(|| DEFAULT_API_KEY.to_string());
        let mut data_dir = config.data_dir.clone();
        let mut env_name = config.env.clone();

        if let Some(profile) = profile_config {
            if let Some(value) = &profile.base_url {
                base_url = value.clone();
            }
            if let Some(value) = &profile.api_key {
                api_key = value.clone();
            }
            if profile.data_dir.is_some() {
                data_dir = profile.data_dir.clone();
            }
            if profile.env.is_some() {
                env_name = profile.env.clone();
            }
        }

        let env_path = self
            .explicit_env
            .clone()
            .or_else(|| env_name.map(|name| resolve_relative(config_dir, Path::new(&name))));

        let mut env_files = Vec::new();
        if let Some(path) = env_path {
            let mut env = EnvMap::new();
            load_env_file(&path, &mut env)?;
            if let Some(value) = env.remove(BASE_URL_VAR) {
                base_url = value;
            }
            if let Some(value) = env.remove(API_KEY_VAR) {
                api_key = value;
            }
            tracing::debug!(path = %path.display(), "loaded env file");
            env_files.push(path);
        }

        if let Some(value) = &self.base_url {
            base_url = value.clone();
        }
        if let Some(value) = &self.api_key {
            api_key = value.clone();
        }

        let data_dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => resolve_relative(
                config_dir,
                Path::new(data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR)),
            ),
        };

        Ok(Settings {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            health_path: config
                .health_path
                .clone()
                .unwrap_or_else(|| DEFAULT_HEALTH_PATH.to_string()),
            data_dir,
            probe_interval: config
                .probe_interval_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_PROBE_INTERVAL),
            profile_name: profile.map(|p| p.name),
            env_files,
        })
    }
}

struct ResolvedProfile<'a> {
    name: String,
    config: &'a ProfileConfig,
}

fn resolve_profile<'a>(
    config: &'a DeckConfig,
    requested: Option<&str>,
) -> Result<Option<ResolvedProfile<'a>>> {
    if let Some(name) = requested {
        return match config.profiles.get(name) {
            Some(profile) => Ok(Some(ResolvedProfile {
                name: name.to_string(),
                config: profile,
            })),
            None => bail!("Unknown profile: {}", name),
        };
    }

    if let Some(default) = &config.default_profile {
        return match config.profiles.get(default) {
            Some(profile) => Ok(Some(ResolvedProfile {
                name: default.to_string(),
                config: profile,
            })),
            None => bail!("Default profile {} is not defined", default),
        };
    }

    Ok(None)
}

fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use anyhow::Result;
    use tempfile::tempdir;

    fn write_file(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn defaults_apply_without_config() -> Result<()> {
        let temp = tempdir()?;
        let settings = SettingsBuilder::new(temp.path().to_path_buf(), None).build()?;

        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.api_key, DEFAULT_API_KEY);
        assert_eq!(settings.health_path, "/health");
        assert_eq!(settings.data_dir, temp.path().join("data"));
        assert_eq!(settings.probe_interval, Duration::from_secs(10));
        assert_eq!(settings.profile_name, None);
        Ok(())
    }

    #[test]
    fn layers_profile_env_file_and_overrides() -> Result<()> {
        let temp = tempdir()?;
        let dir = temp.path();
        write_file(
            &dir.join("searchdeck.json"),
            r#"{
  "baseUrl": "http://root:7700/",
  "apiKey": "root-key",
  "healthPath": "/healthz",
  "probeIntervalSecs": 3,
  "defaultProfile": "local",
  "profiles": {
    "local": { "apiKey": "local-key", "dataDir": "fixtures" },
    "staging": { "baseUrl": "http://staging:7700", "env": "staging.env" }
  }
}
"#,
        );
        write_file(&dir.join("staging.env"), "SEARCHDECK_API_KEY=from-env\n");

        let loaded = load_config(dir)?.expect("config present");

        let local = SettingsBuilder::new(dir.to_path_buf(), Some(loaded.clone())).build()?;
        assert_eq!(local.profile_name.as_deref(), Some("local"));
        assert_eq!(local.base_url, "http://root:7700");
        assert_eq!(local.api_key, "local-key");
        assert_eq!(local.health_path, "/healthz");
        assert_eq!(local.data_dir, dir.join("fixtures"));
        assert_eq!(local.probe_interval, Duration::from_secs(3));

        let staging = SettingsBuilder::new(dir.to_path_buf(), Some(loaded.clone()))
            .profile(Some("staging".to_string()))
            .build()?;
        assert_eq!(staging.base_url, "http://staging:7700");
        assert_eq!(staging.api_key, "from-env");
        assert_eq!(staging.env_files, vec![dir.join("staging.env")]);

        let overridden = SettingsBuilder::new(dir.to_path_buf(), Some(loaded))
            .profile(Some("staging".to_string()))
            .api_key(Some("cli-key".to_string()))
            .base_url(Some("http://cli:1".to_string()))
            .build()?;
        assert_eq!(overridden.api_key, "cli-key");
        assert_eq!(overridden.base_url, "http://cli:1");
        Ok(())
    }

    #[test]
    fn unknown_profile_is_an_error() -> Result<()> {
        let temp = tempdir()?;
        let err = SettingsBuilder::new(temp.path().to_path_buf(), None)
            .profile(Some("nope".to_string()))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Unknown profile: nope"));
        Ok(())
    }
}
