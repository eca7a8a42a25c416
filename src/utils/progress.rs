use crate::conversion::ConversionProgress;
use crate::utils::filesystem::format_file_size;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::Path;
use std::time::{Duration, Instant};

// 10000 steps gives 0.01% resolution
const BAR_LENGTH: u64 = 10_000;

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} {prefix:20!} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {percent:>3}% | {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█▉▊▋▌▍▎▏ ")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix:20!} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// One progress bar per conversion, stacked on stderr.
#[derive(Clone)]
pub struct ProgressMonitor {
    multi: MultiProgress,
}

impl ProgressMonitor {
    pub fn new(visible: bool) -> Self {
        let target = if visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        Self {
            multi: MultiProgress::with_draw_target(target),
        }
    }

    pub fn add_job(&self, input: &Path) -> JobProgress {
        let bar = self.multi.add(ProgressBar::new(BAR_LENGTH));
        bar.set_style(bar_style());
        bar.set_prefix(
            input
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        bar.set_message("Waiting...");
        bar.enable_steady_tick(Duration::from_millis(120));

        JobProgress {
            bar,
            started: Instant::now(),
        }
    }
}

pub struct JobProgress {
    bar: ProgressBar,
    started: Instant,
}

impl JobProgress {
    pub fn update(&self, progress: &ConversionProgress) {
        match progress.fraction {
            Some(fraction) => {
                self.bar.set_position((fraction * BAR_LENGTH as f64) as u64);
                let mut message = progress.phase.as_str().to_string();
                if let Some(eta) = estimate_remaining(self.started.elapsed(), fraction) {
                    message.push_str(&format!(" • ETA {}", format_duration(eta)));
                }
                self.bar.set_message(message);
            }
            None => {
                self.bar.set_style(spinner_style());
                self.bar.set_message(progress.to_string());
            }
        }
    }

    pub fn finish_success(&self, size_bytes: u64) {
        self.bar.set_style(bar_style());
        self.bar.set_position(BAR_LENGTH);
        self.bar.finish_with_message(format!(
            "Done in {} ({})",
            format_duration(self.started.elapsed()),
            format_file_size(size_bytes)
        ));
    }

    pub fn finish_failed(&self, reason: &str) {
        self.bar.abandon_with_message(format!("Failed: {}", reason));
    }

    pub fn finish_cancelled(&self) {
        self.bar.abandon_with_message("Cancelled");
    }
}

/// Linear extrapolation, withheld until enough of the job has run to be meaningful.
fn estimate_remaining(elapsed: Duration, fraction: f64) -> Option<Duration> {
    if fraction < 0.01 || fraction >= 1.0 {
        return None;
    }
    let elapsed = elapsed.as_secs_f64();
    let remaining = elapsed / fraction - elapsed;
    Some(Duration::from_secs_f64(remaining.clamp(0.0, 48.0 * 3600.0)))
}

pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
