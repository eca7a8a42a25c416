pub mod error;
pub mod ffmpeg;
pub mod filesystem;
pub mod logging;
pub mod progress;

pub use error::{Error, Result};
pub use ffmpeg::{FfmpegWrapper, HdrVerification};
pub use filesystem::{
    default_output_dir, ensure_output_dir, find_video_files, format_file_size,
    is_video_file, supported_extensions_list, SUPPORTED_EXTENSIONS,
};
pub use logging::setup_logging;
pub use progress::{JobProgress, ProgressMonitor};
