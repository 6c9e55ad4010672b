mod env_file;
mod loader;
mod settings;

pub use env_file::{load_env_file, EnvMap};
pub use loader::{load_config, DeckConfig, LoadedConfig, ProfileConfig, CONFIG_FILE_NAME};
pub use settings::{
    Settings, SettingsBuilder, API_KEY_VAR, BASE_URL_VAR, DEFAULT_API_KEY, DEFAULT_BASE_URL,
    DEFAULT_PROBE_INTERVAL,
};
