use crate::conversion::QualityOverride;
use crate::utils::{Error, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version)]
#[command(name = "hdr-convert")]
#[command(about = "Re-encode videos as 10-bit HEVC tagged with HLG colour metadata")]
#[command(long_about = "
Re-encodes videos to 10-bit HEVC (libx265) and tags them with BT.2020 / HLG
colour metadata so Apple devices show the HDR badge. Pixels are not
tone-mapped; only the colour tags and container change.

EXAMPLES:
  # Convert one file into ~/Movies/HDR Converted (or ~/Videos/HDR Converted)
  hdr-convert clip.mov

  # Convert a folder, two jobs at a time, into a custom directory
  hdr-convert ~/Videos/Raw -o ~/Videos/HDR -j 2

  # Constant quality instead of the default 35M bitrate
  hdr-convert clip.mp4 --crf 18

  # Check that ffmpeg with libx265 is usable
  hdr-convert --check

  # Inspect the colour tags of a converted file
  hdr-convert --verify clip_HDR.mp4
")]
pub struct CliArgs {
    /// Input video files or directories (searched recursively)
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Destination directory for converted files
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Video bitrate override, e.g. 35M or 20000k
    #[arg(short, long, value_name = "RATE", conflicts_with = "crf")]
    pub bitrate: Option<String>,

    /// Constant quality override (0-51, lower is better)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(0..=51))]
    pub crf: Option<u8>,

    /// Number of conversions to run at the same time
    #[arg(short, long, default_value_t = 1, value_name = "N")]
    pub jobs: usize,

    /// Configuration file path
    #[arg(long, default_value = "config.yaml", value_name = "FILE")]
    pub config: PathBuf,

    /// Check that the encoder is usable and exit
    #[arg(long)]
    pub check: bool,

    /// Print the HDR colour metadata of a file and exit
    #[arg(long, value_name = "FILE")]
    pub verify: Option<PathBuf>,

    /// Print final job statuses as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl CliArgs {
    pub fn get_log_level<'a>(&self, config_level: &'a str) -> &'a str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            config_level
        }
    }

    pub fn should_use_color(&self) -> bool {
        !self.no_color
    }

    pub fn is_info_command(&self) -> bool {
        self.check || self.verify.is_some()
    }

    pub fn should_convert(&self) -> bool {
        !self.is_info_command() && !self.inputs.is_empty()
    }

    pub fn quality_override(&self) -> Option<QualityOverride> {
        match (&self.bitrate, self.crf) {
            (Some(rate), _) => Some(QualityOverride::Bitrate(rate.clone())),
            (None, Some(crf)) => Some(QualityOverride::Crf(crf)),
            (None, None) => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(Error::validation("--jobs must be at least 1"));
        }

        if let Some(quality) = self.quality_override() {
            quality
                .validate()
                .map_err(|e| Error::validation(e.to_string()))?;
        }

        if self.should_convert() {
            for input in &self.inputs {
                if !input.exists() {
                    return Err(Error::validation(format!(
                        "Input path does not exist: {}",
                        input.display()
                    )));
                }
            }
        }

        if let Some(dir) = &self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(Error::validation(format!(
                    "Output path is not a directory: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}
