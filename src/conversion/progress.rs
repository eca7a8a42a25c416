use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

// `out_time=` comes from `-progress pipe:1`, bare `time=` from the classic stats line.
// `out_time_us=` / `out_time_ms=` are skipped so one progress block yields one event.
static ELAPSED_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)(?:out_)?time=(-)?(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    Encoding,
    /// Total duration unknown, so no fraction is available
    Processing,
    Finalizing,
}

impl ProgressPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encoding => "encoding",
            Self::Processing => "processing",
            Self::Finalizing => "finalizing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionProgress {
    /// Completed share in [0.0, 1.0]; `None` while the duration is unknown
    pub fraction: Option<f64>,
    pub phase: ProgressPhase,
    /// Encoder position in seconds, when the line carried one
    pub elapsed_secs: Option<f64>,
}

impl ConversionProgress {
    pub fn percent(&self) -> Option<f64> {
        self.fraction.map(|f| f * 100.0)
    }
}

impl fmt::Display for ConversionProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.phase, self.percent(), self.elapsed_secs) {
            (ProgressPhase::Finalizing, _, _) => write!(f, "Finalizing..."),
            (_, Some(percent), _) => write!(f, "Converting... {:.1}%", percent),
            (_, None, Some(elapsed)) => write!(f, "Converting... {:.1}s", elapsed),
            (_, None, None) => write!(f, "Converting..."),
        }
    }
}

/// Turns encoder status lines into progress values for a job of known length.
#[derive(Debug, Clone, Copy)]
pub struct ProgressParser {
    total_duration: Option<f64>,
}

impl ProgressParser {
    pub fn new(total_duration: Option<f64>) -> Self {
        let total_duration = total_duration.filter(|d| d.is_finite() && *d > 0.0);
        Self { total_duration }
    }

    pub fn total_duration(&self) -> Option<f64> {
        self.total_duration
    }

    pub fn parse_line(&self, line: &str) -> Option<ConversionProgress> {
        let line = line.trim();

        if line == "progress=end" {
            return Some(ConversionProgress {
                fraction: self.total_duration.map(|_| 1.0),
                phase: ProgressPhase::Finalizing,
                elapsed_secs: None,
            });
        }

        let elapsed = parse_elapsed(line)?;
        let progress = match self.total_duration {
            Some(total) => ConversionProgress {
                fraction: Some((elapsed / total).clamp(0.0, 1.0)),
                phase: ProgressPhase::Encoding,
                elapsed_secs: Some(elapsed),
            },
            None => ConversionProgress {
                fraction: None,
                phase: ProgressPhase::Processing,
                elapsed_secs: Some(elapsed),
            },
        };

        Some(progress)
    }
}

/// Elapsed encoder time in seconds; negative start offsets count as zero.
fn parse_elapsed(line: &str) -> Option<f64> {
    let captures = ELAPSED_REGEX.captures(line)?;
    let hours: f64 = captures[2].parse().ok()?;
    let minutes: f64 = captures[3].parse().ok()?;
    let seconds: f64 = captures[4].parse().ok()?;

    if captures.get(1).is_some() {
        return Some(0.0);
    }

    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Keeps the progress stream of one job non-decreasing.
#[derive(Debug, Default)]
pub(crate) struct MonotonicProgress {
    last: Option<ConversionProgress>,
}

impl MonotonicProgress {
    /// Returns the value to report, or `None` for an exact repeat of the previous event.
    pub(crate) fn advance(&mut self, mut progress: ConversionProgress) -> Option<ConversionProgress> {
        if let Some(previous) = &self.last {
            if let (Some(prev), Some(current)) = (previous.fraction, progress.fraction) {
                if current < prev {
                    progress.fraction = Some(prev);
                }
            }
            if progress == *previous {
                return None;
            }
        }

        self.last = Some(progress.clone());
        Some(progress)
    }
}
