//! TOML configuration file loading
//!
//! Supports `~/.config/voxbridge/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct VoxbridgeConfigFile {
    /// Google Cloud credentials
    #[serde(default)]
    pub google: GoogleFileConfig,

    /// Telegram delivery
    #[serde(default)]
    pub telegram: TelegramFileConfig,

    /// Database and output locations
    #[serde(default)]
    pub storage: StorageFileConfig,

    /// Default languages for new users
    #[serde(default)]
    pub languages: LanguagesFileConfig,

    /// Speech recognition tuning
    #[serde(default)]
    pub recognition: RecognitionFileConfig,

    /// User accounts
    #[serde(default)]
    pub users: UsersFileConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoogleFileConfig {
    pub api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TelegramFileConfig {
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageFileConfig {
    /// SQLite database file
    pub db_path: Option<String>,

    /// Directory the local voice store writes into
    pub out_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LanguagesFileConfig {
    pub source: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecognitionFileConfig {
    /// Candidate sample rates, tried in order
    pub sample_rates: Option<Vec<u32>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsersFileConfig {
    /// Starting points balance
    pub initial_points: Option<i64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `VoxbridgeConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> VoxbridgeConfigFile {
    config_file_path().map_or_else(VoxbridgeConfigFile::default, |path| load_from(&path))
}

/// Load a TOML config file from `path`, falling back to defaults
pub fn load_from(path: &Path) -> VoxbridgeConfigFile {
    if !path.exists() {
        return VoxbridgeConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                VoxbridgeConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            VoxbridgeConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/voxbridge/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("voxbridge").join("config.toml"))
}
