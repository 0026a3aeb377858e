use std::{
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use error_stack::{Report, Result, ResultExt};
use serde::{Deserialize, Serialize};

use crate::{
    platform::{PlatformVersion, MINIMUM_PLATFORM_VERSION},
    utils::IntoReportExt,
};

pub const CONFIG_FILE_NAME: &str = "signin_config.toml";

pub const DEFAULT_CONFIG_FILE_TEXT: &str = r#"

# debug = true

[platform]
os_version = "17.0"
minimum_version = "13.0"

[simulator]
response_delay_ms = 0
"#;

#[derive(thiserror::Error, Debug)]
pub enum ConfigFileError {
    #[error("Save default")]
    SaveDefault,
    #[error("Not a directory")]
    NotDirectory,
    #[error("Load config file")]
    LoadConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ConfigFile {
    /// Enables debug logging.
    pub debug: Option<bool>,
    pub platform: PlatformConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

impl ConfigFile {
    pub fn save_default(dir: impl AsRef<Path>) -> Result<(), ConfigFileError> {
        let file_path =
            Self::default_config_file_path(dir).change_context(ConfigFileError::SaveDefault)?;
        let mut file = std::fs::File::create(file_path).into_error(ConfigFileError::SaveDefault)?;
        file.write_all(DEFAULT_CONFIG_FILE_TEXT.as_bytes())
            .into_error(ConfigFileError::SaveDefault)?;
        Ok(())
    }

    pub fn load(dir: impl AsRef<Path>) -> Result<ConfigFile, ConfigFileError> {
        let file_path =
            Self::default_config_file_path(&dir).change_context(ConfigFileError::LoadConfig)?;
        if !file_path.exists() {
            Self::save_default(dir).change_context(ConfigFileError::LoadConfig)?;
        }

        let config_string =
            std::fs::read_to_string(file_path).into_error(ConfigFileError::LoadConfig)?;
        Self::parse(&config_string)
    }

    pub fn parse(config_string: &str) -> Result<ConfigFile, ConfigFileError> {
        toml::from_str(config_string).into_error(ConfigFileError::LoadConfig)
    }

    pub fn default_config_file_path(dir: impl AsRef<Path>) -> Result<PathBuf, ConfigFileError> {
        if !dir.as_ref().is_dir() {
            return Err(Report::new(ConfigFileError::NotDirectory));
        }
        let mut file_path = dir.as_ref().to_path_buf();
        file_path.push(CONFIG_FILE_NAME);
        Ok(file_path)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlatformConfig {
    /// Version which the simulated platform reports.
    pub os_version: PlatformVersion,
    #[serde(default = "default_minimum_version")]
    pub minimum_version: PlatformVersion,
}

fn default_minimum_version() -> PlatformVersion {
    MINIMUM_PLATFORM_VERSION
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SimulatorConfig {
    /// Delay before the simulated platform responds.
    #[serde(default)]
    pub response_delay_ms: u64,
}

impl SimulatorConfig {
    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }
}
