//! Configuration management for voxbridge
//!
//! Values resolve with priority environment > TOML file > default.

pub mod file;

use std::path::PathBuf;

use crate::db::UserDefaults;
use crate::pipeline::DEFAULT_SAMPLE_RATES;
use crate::{Error, Result, lang};

use file::VoxbridgeConfigFile;

/// Default starting balance for new users
pub const DEFAULT_INITIAL_POINTS: i64 = 60;

/// voxbridge configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Google Cloud API key (`GOOGLE_API_KEY`)
    pub google_api_key: Option<String>,

    /// Telegram bot token (`TELEGRAM_BOT_TOKEN`)
    pub telegram_token: Option<String>,

    /// SQLite database path (`VOXBRIDGE_DB_PATH`)
    pub db_path: PathBuf,

    /// Local voice store root (`VOXBRIDGE_OUT_DIR`)
    pub out_dir: PathBuf,

    /// Source language for new users
    pub default_source_lang: String,

    /// Target language for new users
    pub default_target_lang: String,

    /// Candidate recognition sample rates, in order
    pub sample_rates: Vec<u32>,

    /// Starting points balance for new users
    pub initial_points: i64,
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if a configured value is invalid
    pub fn load() -> Result<Self> {
        Self::resolve(file::load_config_file(), |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a configured value is invalid
    pub fn resolve(
        fc: VoxbridgeConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let data_dir = directories::BaseDirs::new()
            .map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("voxbridge"));

        let db_path = env("VOXBRIDGE_DB_PATH")
            .or(fc.storage.db_path)
            .map_or_else(|| data_dir.join("voxbridge.db"), PathBuf::from);

        let out_dir = env("VOXBRIDGE_OUT_DIR")
            .or(fc.storage.out_dir)
            .map_or_else(|| data_dir.join("voice"), PathBuf::from);

        let default_source_lang = fc
            .languages
            .source
            .unwrap_or_else(|| lang::RUSSIAN.code.to_string());
        let default_target_lang = fc
            .languages
            .target
            .unwrap_or_else(|| lang::ENGLISH.code.to_string());
        for code in [&default_source_lang, &default_target_lang] {
            if lang::find(code).is_none() {
                return Err(Error::Config(format!("unsupported language: {code}")));
            }
        }

        let sample_rates = fc
            .recognition
            .sample_rates
            .unwrap_or_else(|| DEFAULT_SAMPLE_RATES.to_vec());
        if sample_rates.is_empty() || sample_rates.contains(&0) {
            return Err(Error::Config(
                "recognition.sample_rates must be non-empty and non-zero".to_string(),
            ));
        }

        Ok(Self {
            google_api_key: env("GOOGLE_API_KEY").or(fc.google.api_key),
            telegram_token: env("TELEGRAM_BOT_TOKEN").or(fc.telegram.token),
            db_path,
            out_dir,
            default_source_lang,
            default_target_lang,
            sample_rates,
            initial_points: fc.users.initial_points.unwrap_or(DEFAULT_INITIAL_POINTS),
        })
    }

    /// Defaults applied to newly seen users
    #[must_use]
    pub fn user_defaults(&self) -> UserDefaults {
        UserDefaults {
            source_lang: self.default_source_lang.clone(),
            target_lang: self.default_target_lang.clone(),
            initial_points: self.initial_points,
        }
    }

    /// Google API key, required by every speech adapter
    ///
    /// # Errors
    ///
    /// Returns error if no key is configured
    pub fn require_google_api_key(&self) -> Result<String> {
        self.google_api_key
            .clone()
            .ok_or_else(|| Error::Config("GOOGLE_API_KEY not set".to_string()))
    }
}
