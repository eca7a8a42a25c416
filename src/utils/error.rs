use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Output path error: {message}")]
    Path { message: String },

    #[error("Encoder capability error: {message}")]
    Capability { message: String },

    #[error("Encoding failed: {message}")]
    Encoding {
        message: String,
        stderr_tail: Vec<String>,
    },

    #[error("Conversion cancelled")]
    Cancelled,

    #[error("FFmpeg error: {message}")]
    Ffmpeg { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl Error {
    pub fn invalid_input<T: Into<String>>(message: T) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn path<T: Into<String>>(message: T) -> Self {
        Self::Path {
            message: message.into(),
        }
    }

    pub fn capability<T: Into<String>>(message: T) -> Self {
        Self::Capability {
            message: message.into(),
        }
    }

    pub fn encoding<T: Into<String>>(message: T, stderr_tail: Vec<String>) -> Self {
        Self::Encoding {
            message: message.into(),
            stderr_tail,
        }
    }

    pub fn ffmpeg<T: Into<String>>(message: T) -> Self {
        Self::Ffmpeg {
            message: message.into(),
        }
    }

    pub fn parse<T: Into<String>>(message: T) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Cancellation is a terminal outcome of its own and is not reported as a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Captured encoder stderr, oldest line first. Empty for non-encoding errors.
    pub fn diagnostic(&self) -> &[String] {
        match self {
            Self::Encoding { stderr_tail, .. } => stderr_tail,
            _ => &[],
        }
    }
}
