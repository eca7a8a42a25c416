use crate::config::is_valid_bitrate;
use crate::utils::{Error, Result};
use std::path::{Path, PathBuf};

/// Replaces the default 35 Mbps video target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityOverride {
    /// ffmpeg bitrate notation, e.g. `35M` or `20000k`
    Bitrate(String),
    /// x265 constant rate factor, 0-51
    Crf(u8),
}

impl QualityOverride {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Bitrate(rate) if !is_valid_bitrate(rate) => Err(Error::invalid_input(format!(
                "Invalid video bitrate: {} (expected e.g. 35M or 20000k)",
                rate
            ))),
            Self::Crf(crf) if *crf > 51 => Err(Error::invalid_input(format!(
                "Invalid CRF value: {} (must be between 0 and 51)",
                crf
            ))),
            _ => Ok(()),
        }
    }

    pub(crate) fn to_args(&self) -> [String; 2] {
        match self {
            Self::Bitrate(rate) => ["-b:v".to_string(), rate.clone()],
            Self::Crf(crf) => ["-crf".to_string(), crf.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub input: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub quality: Option<QualityOverride>,
}

impl ConversionRequest {
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            input: input.into(),
            output_dir: None,
            quality: None,
        }
    }

    pub fn with_output_dir<P: Into<PathBuf>>(mut self, output_dir: P) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn with_quality(mut self, quality: QualityOverride) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }
}
