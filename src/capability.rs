//! Encoder capability check run once before any conversion is accepted.

use serde::Serialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

const VERSION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityReport {
    pub available: bool,
    pub reason: String,
    pub version: Option<String>,
    pub encoder_path: String,
}

#[derive(Debug, Clone)]
pub struct CapabilityProbe {
    ffmpeg_path: String,
    required_encoders: Vec<String>,
}

impl CapabilityProbe {
    pub fn new<S: Into<String>>(ffmpeg_path: S, required_encoders: Vec<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            required_encoders,
        }
    }

    /// Never fails: launch problems come back as an unavailable report.
    pub async fn probe(&self) -> CapabilityReport {
        debug!("Probing encoder capabilities: {} -version", self.ffmpeg_path);

        let output = Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let report = match tokio::time::timeout(VERSION_TIMEOUT, output).await {
            Ok(Ok(output)) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                evaluate(
                    &self.ffmpeg_path,
                    output.status.success(),
                    &text,
                    &self.required_encoders,
                )
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                self.unavailable("encoder not found on PATH".to_string())
            }
            Ok(Err(e)) => self.unavailable(format!("failed to launch encoder: {}", e)),
            Err(_) => self.unavailable(format!(
                "encoder did not answer -version within {}s",
                VERSION_TIMEOUT.as_secs()
            )),
        };

        if report.available {
            info!(
                "Encoder ready: {} ({})",
                report.encoder_path,
                report.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            warn!("Encoder unavailable: {}", report.reason);
        }

        report
    }

    fn unavailable(&self, reason: String) -> CapabilityReport {
        CapabilityReport {
            available: false,
            reason,
            version: None,
            encoder_path: self.ffmpeg_path.clone(),
        }
    }
}

/// Decides availability from the `-version` output of the encoder.
pub fn evaluate(
    encoder_path: &str,
    exited_ok: bool,
    version_output: &str,
    required_encoders: &[String],
) -> CapabilityReport {
    let version = parse_version(version_output);

    let reason = if !exited_ok {
        Some("encoder exited with an error when asked for its version".to_string())
    } else if version.is_none() {
        Some("binary does not identify itself as ffmpeg".to_string())
    } else {
        required_encoders
            .iter()
            .find(|encoder| !version_output.contains(encoder.as_str()))
            .map(|missing| format!("encoder lacks required component: {}", missing))
    };

    CapabilityReport {
        available: reason.is_none(),
        reason: reason.unwrap_or_else(|| "ok".to_string()),
        version,
        encoder_path: encoder_path.to_string(),
    }
}

/// `ffmpeg version 6.1.1 Copyright ...` -> `6.1.1`
fn parse_version(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("ffmpeg version "))
        .and_then(|rest| rest.split_whitespace().next())
        .map(str::to_string)
}
