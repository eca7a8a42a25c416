//! Logging helpers for the conversion lifecycle

use crate::conversion::ConversionArguments;
use crate::utils::filesystem::format_file_size;
use std::path::Path;
use std::time::Duration;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn log_conversion_start(input: &Path, output: &Path, arguments: &ConversionArguments) {
    tracing::info!("Converting {} -> {}", file_name(input), file_name(output));
    tracing::debug!("Running: ffmpeg {}", arguments);
}

pub fn log_conversion_complete(output: &Path, elapsed: Duration, size_bytes: u64) {
    tracing::info!(
        "Converted {} in {:.1}s ({})",
        file_name(output),
        elapsed.as_secs_f64(),
        format_file_size(size_bytes)
    );
}

pub fn log_batch_summary(succeeded: usize, failed: usize, cancelled: usize) {
    tracing::info!(
        "Batch finished: {} converted, {} failed, {} cancelled",
        succeeded,
        failed,
        cancelled
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_falls_back_to_display() {
        assert_eq!(file_name(Path::new("/videos/clip.mov")), "clip.mov");
        assert_eq!(file_name(Path::new("/")), "/");
    }

    #[test]
    fn test_helpers_run_without_subscriber() {
        log_conversion_complete(Path::new("clip_HDR.mp4"), Duration::from_secs(12), 1_048_576);
        log_batch_summary(1, 0, 0);
    }
}
