pub mod capability;
pub mod cli;
pub mod config;
pub mod conversion;
pub mod utils;

pub use capability::{CapabilityProbe, CapabilityReport};
pub use config::Config;
pub use conversion::{
    ConversionArguments, ConversionJob, ConversionOutput, ConversionProgress, ConversionRequest,
    ConversionResult, ConversionRunner, EncodingSettings, JobDescriptor, JobHandle, JobId,
    JobRegistry, JobState, JobStatus, ProgressParser, ProgressPhase, QualityOverride,
};
pub use utils::{Error, FfmpegWrapper, HdrVerification, Result};
