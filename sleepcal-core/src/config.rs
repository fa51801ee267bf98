//! Configuration at ~/.config/sleepcal/config.toml, overridable with
//! SLEEPCAL_* environment variables.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarMetadata;
use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_DAYS_BACK, DEFAULT_PRODUCT_ID};
use crate::error::{SleepcalError, SleepcalResult};

static DEFAULT_OUTPUT_PATH: &str = "~/calendar/oura-sleep.ics";

/// Also accepted for the API token when `oura_token` isn't configured
static TOKEN_ENV_VAR: &str = "OURA_TOKEN";

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

fn default_days_back() -> i64 {
    DEFAULT_DAYS_BACK
}

fn default_product_id() -> String {
    DEFAULT_PRODUCT_ID.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepcalConfig {
    /// Personal access token for the Oura API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oura_token: Option<String>,

    /// Where the calendar file is written (~ is expanded)
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default = "default_days_back")]
    pub days_back: i64,

    /// Sessions with less time in bed than this are not exported
    #[serde(default)]
    pub min_sleep_duration_minutes: i64,

    #[serde(default = "default_product_id")]
    pub product_id: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl SleepcalConfig {
    pub fn config_path() -> SleepcalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SleepcalError::Config("Could not determine config directory".into()))?
            .join("sleepcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented-out config file
    /// there on first run.
    pub fn load() -> SleepcalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (which may not exist), then apply environment overrides.
    pub fn load_from(path: &Path) -> SleepcalResult<Self> {
        let mut config: SleepcalConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("SLEEPCAL").try_parsing(true))
            .build()
            .map_err(|e| SleepcalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SleepcalError::Config(e.to_string()))?;

        if config.oura_token.as_deref().is_none_or(str::is_empty) {
            config.oura_token = std::env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> SleepcalResult<()> {
        if self.days_back < 0 {
            return Err(SleepcalError::Config(format!(
                "days_back must not be negative, got {}",
                self.days_back
            )));
        }
        if self.min_sleep_duration_minutes < 0 {
            return Err(SleepcalError::Config(format!(
                "min_sleep_duration_minutes must not be negative, got {}",
                self.min_sleep_duration_minutes
            )));
        }
        Ok(())
    }

    /// Output path with ~ expanded
    pub fn output_path(&self) -> PathBuf {
        expand_path(&self.output_path)
    }

    pub fn metadata(&self) -> CalendarMetadata {
        CalendarMetadata::with_product_id(&self.product_id)
    }

    /// Effective configuration as TOML, with the token redacted.
    pub fn to_toml(&self) -> SleepcalResult<String> {
        let mut redacted = self.clone();
        if redacted.oura_token.is_some() {
            redacted.oura_token = Some("********".to_string());
        }
        toml::to_string_pretty(&redacted).map_err(|e| SleepcalError::Serialization(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SleepcalResult<()> {
        let contents = format!(
            "\
# sleepcal configuration

# Oura personal access token (or set OURA_TOKEN):
# oura_token = \"...\"

# Where the sleep calendar is written:
# output_path = \"{}\"

# How many days back to fetch:
# days_back = {}

# Skip sessions with less time in bed than this (naps):
# min_sleep_duration_minutes = 0
",
            DEFAULT_OUTPUT_PATH, DEFAULT_DAYS_BACK
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SleepcalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SleepcalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

/// Expand ~ in paths to the home directory
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
