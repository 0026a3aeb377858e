pub mod args;
pub mod file;

use error_stack::{Result, ResultExt};

use crate::{platform::PlatformVersion, utils::IntoReportExt};

use self::{
    args::RunMode,
    file::{ConfigFile, SimulatorConfig},
};

#[derive(thiserror::Error, Debug)]
pub enum GetConfigError {
    #[error("Get working directory error")]
    GetWorkingDir,
    #[error("File loading failed")]
    LoadFileError,
}

#[derive(Debug)]
pub struct Config {
    file: ConfigFile,
    os_version: PlatformVersion,
    mode: RunMode,
}

impl Config {
    pub fn new(file: ConfigFile, os_version: Option<PlatformVersion>, mode: RunMode) -> Self {
        Self {
            os_version: os_version.unwrap_or(file.platform.os_version),
            file,
            mode,
        }
    }

    /// Enables debug logging.
    pub fn debug_mode(&self) -> bool {
        self.file.debug.unwrap_or(false)
    }

    /// Version which the platform reports. Command line value overrides
    /// the config file value.
    pub fn os_version(&self) -> PlatformVersion {
        self.os_version
    }

    /// Oldest platform version which has sign in available.
    pub fn minimum_version(&self) -> PlatformVersion {
        self.file.platform.minimum_version
    }

    pub fn simulator(&self) -> &SimulatorConfig {
        &self.file.simulator
    }

    pub fn mode(&self) -> &RunMode {
        &self.mode
    }
}

pub fn get_config() -> Result<Config, GetConfigError> {
    let args_config = args::get_config();
    let config_dir = match args_config.config_dir {
        Some(dir) => dir,
        None => std::env::current_dir().into_error(GetConfigError::GetWorkingDir)?,
    };
    let file_config = ConfigFile::load(&config_dir)
        .change_context(GetConfigError::LoadFileError)
        .attach_printable_lazy(|| format!("config directory: {}", config_dir.display()))?;

    Ok(Config::new(
        file_config,
        args_config.os_version,
        args_config.mode,
    ))
}
