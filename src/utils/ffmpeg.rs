use crate::config::ToolsConfig;
use crate::conversion::ConversionArguments;
use crate::utils::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command as TokioCommand};
use tracing::debug;

static DURATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Duration: (\d{2}):(\d{2}):(\d{2})\.(\d{2})").unwrap()
});

const HLG_TRANSFER: &str = "arib-std-b67";

/// Colour metadata of the first video stream of a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HdrVerification {
    pub color_primaries: String,
    pub color_transfer: String,
    pub color_space: String,
    pub pixel_format: String,
    pub is_hdr: bool,
}

#[derive(Debug, Clone)]
pub struct FfmpegWrapper {
    ffmpeg_path: String,
    ffprobe_path: Option<String>,
    probe_timeout: Duration,
}

impl FfmpegWrapper {
    pub fn new(ffmpeg_path: String, ffprobe_path: Option<String>) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            probe_timeout: Duration::from_secs(30),
        }
    }

    /// Resolves both tools the way the packaged app does: explicit path,
    /// bundled `ffmpeg/` folder next to the executable, then `PATH`.
    /// An unresolved encoder keeps its configured name so the capability
    /// probe can report it.
    pub fn from_config(tools: &ToolsConfig, probe_timeout_secs: u64) -> Self {
        let ffmpeg_path = locate_tool(&tools.ffmpeg)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|| tools.ffmpeg.clone());
        let ffprobe_path = locate_tool(&tools.ffprobe).map(|p| p.to_string_lossy().to_string());

        if ffprobe_path.is_none() {
            debug!("ffprobe not found, progress will be reported without percentages");
        }

        Self {
            ffmpeg_path,
            ffprobe_path,
            probe_timeout: Duration::from_secs(probe_timeout_secs),
        }
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> Option<&str> {
        self.ffprobe_path.as_deref()
    }

    /// Container duration in seconds, or `None` when it cannot be determined.
    pub async fn probe_duration<P: AsRef<Path>>(&self, input_path: P) -> Option<f64> {
        let ffprobe = self.ffprobe_path.as_ref()?;
        let input_path = input_path.as_ref().to_string_lossy();

        let command = TokioCommand::new(ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                &input_path,
            ])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.probe_timeout, command).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                debug!("Failed to run ffprobe for duration: {}", e);
                return None;
            }
            Err(_) => {
                debug!(
                    "Duration probe timed out after {}s",
                    self.probe_timeout.as_secs()
                );
                return None;
            }
        };

        if !output.status.success() {
            debug!("ffprobe exited with {} during duration probe", output.status);
            return None;
        }

        let duration = parse_duration_output(&String::from_utf8_lossy(&output.stdout));
        debug!("Probed duration for {}: {:?}", input_path, duration);
        duration
    }

    pub fn spawn_encoder(&self, args: &ConversionArguments) -> Result<Child> {
        debug!("Running: {} {}", self.ffmpeg_path, args);

        let child = TokioCommand::new(&self.ffmpeg_path)
            .args(args.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::capability(format!(
                    "Failed to launch encoder at {}: {}",
                    self.ffmpeg_path, e
                ))
            })?;

        Ok(child)
    }

    /// Reads back the colour tags of a converted file.
    pub async fn verify_hdr_metadata<P: AsRef<Path>>(&self, file_path: P) -> Result<HdrVerification> {
        let ffprobe = self
            .ffprobe_path
            .as_ref()
            .ok_or_else(|| Error::ffmpeg("ffprobe not available"))?;
        let file_path = file_path.as_ref().to_string_lossy();

        let output = tokio::time::timeout(
            self.probe_timeout,
            TokioCommand::new(ffprobe)
                .args([
                    "-v",
                    "quiet",
                    "-select_streams",
                    "v:0",
                    "-show_entries",
                    "stream=color_primaries,color_transfer,color_space,pix_fmt",
                    "-of",
                    "json",
                    &file_path,
                ])
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| Error::ffmpeg("ffprobe timed out while reading metadata"))??;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ffmpeg(format!("ffprobe failed: {}", error_msg)));
        }

        parse_verification(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Finds a tool by explicit path, bundled location, or `PATH`.
pub fn locate_tool(configured: &str) -> Option<PathBuf> {
    let configured_path = Path::new(configured);
    if configured_path.components().count() > 1 {
        return configured_path.is_file().then(|| configured_path.to_path_buf());
    }

    if let Some(bundle_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        let executable = format!("{}{}", configured, std::env::consts::EXE_SUFFIX);
        let bundled = [
            bundle_dir.join("ffmpeg").join(&executable),
            bundle_dir.join(&executable),
        ];
        if let Some(found) = bundled.into_iter().find(|p| p.is_file()) {
            debug!("Using bundled tool: {}", found.display());
            return Some(found);
        }
    }

    which::which(configured).ok()
}

/// Accepts a bare number, `duration=<secs>` or the banner `Duration: HH:MM:SS.cc` form.
pub fn parse_duration_output(text: &str) -> Option<f64> {
    for line in text.lines() {
        let value = line.trim();
        let value = value.strip_prefix("duration=").unwrap_or(value);
        if let Ok(duration) = value.parse::<f64>() {
            return (duration.is_finite() && duration >= 0.0).then_some(duration);
        }
    }

    let captures = DURATION_REGEX.captures(text)?;
    let hours: f64 = captures[1].parse().ok()?;
    let minutes: f64 = captures[2].parse().ok()?;
    let seconds: f64 = captures[3].parse().ok()?;
    let centiseconds: f64 = captures[4].parse().ok()?;

    Some(hours * 3600.0 + minutes * 60.0 + seconds + centiseconds / 100.0)
}

pub fn parse_verification(json_output: &str) -> Result<HdrVerification> {
    let probe_data: serde_json::Value = serde_json::from_str(json_output)?;

    let stream = probe_data["streams"]
        .as_array()
        .and_then(|streams| streams.first())
        .ok_or_else(|| Error::parse("No video stream found"))?;

    let field = |name: &str| stream[name].as_str().unwrap_or("unknown").to_string();
    let color_transfer = field("color_transfer");

    Ok(HdrVerification {
        color_primaries: field("color_primaries"),
        is_hdr: color_transfer == HLG_TRANSFER,
        color_transfer,
        color_space: field("color_space"),
        pixel_format: field("pix_fmt"),
    })
}
