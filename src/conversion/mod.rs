pub mod descriptor;
pub mod job;
pub mod progress;
pub mod registry;
pub mod request;
pub mod runner;

pub use descriptor::{validate_input, ConversionArguments, EncodingSettings, JobDescriptor};
pub use job::{JobHandle, JobId, JobState, JobStatus};
pub use progress::{ConversionProgress, ProgressParser, ProgressPhase};
pub use registry::JobRegistry;
pub use request::{ConversionRequest, QualityOverride};
pub use runner::{ConversionJob, ConversionOutput, ConversionResult, ConversionRunner, RunnerOptions};
