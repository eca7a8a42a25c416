use super::types::*;
use crate::utils::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

static BITRATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)?[kKmM]?$").unwrap());

const DEFAULT_CONFIG_PATHS: &[&str] = &["config.default.yaml", "./config/config.default.yaml"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)?;
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `config_path`, then the shipped `config.default.yaml`, then built-in defaults.
    pub fn load_with_fallback<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        if config_path.exists() {
            debug!("Loading configuration from {}", config_path.display());
            return Self::load(config_path);
        }

        for candidate in DEFAULT_CONFIG_PATHS {
            let candidate = Path::new(candidate);
            if candidate.exists() {
                debug!("Loading default configuration from {}", candidate.display());
                return Self::load(candidate);
            }
        }

        debug!("No configuration file found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tools.ffmpeg.trim().is_empty() {
            return Err(Error::validation("tools.ffmpeg must not be empty"));
        }

        if !is_valid_bitrate(&self.encoding.video_bitrate) {
            return Err(Error::validation(format!(
                "Invalid encoding.video_bitrate: {} (expected e.g. 35M or 20000k)",
                self.encoding.video_bitrate
            )));
        }

        if !is_valid_bitrate(&self.encoding.audio_bitrate) {
            return Err(Error::validation(format!(
                "Invalid encoding.audio_bitrate: {} (expected e.g. 256k)",
                self.encoding.audio_bitrate
            )));
        }

        if self.output.suffix.is_empty() {
            return Err(Error::validation(
                "output.suffix must not be empty, converted files would replace their source name",
            ));
        }

        if self.output.extension.is_empty() || self.output.extension.contains('.') {
            return Err(Error::validation(format!(
                "Invalid output.extension: '{}' (use e.g. mp4, without a dot)",
                self.output.extension
            )));
        }

        if self.runner.stderr_tail_lines == 0 {
            return Err(Error::validation(
                "runner.stderr_tail_lines must be greater than 0",
            ));
        }

        if self.runner.probe_timeout_secs == 0 {
            return Err(Error::validation(
                "runner.probe_timeout_secs must be greater than 0",
            ));
        }

        Ok(())
    }
}

pub fn is_valid_bitrate(value: &str) -> bool {
    BITRATE_REGEX.is_match(value)
}
