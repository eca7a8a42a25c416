pub mod loader;
pub mod types;

pub use loader::{is_valid_bitrate, Config};
pub use types::*;
