use crate::utils::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Input containers the encoder pipeline accepts, lowercase and without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm", "m4v", "wmv", "flv"];

const OUTPUT_FOLDER_NAME: &str = "HDR Converted";

pub fn find_video_files<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::invalid_input(format!(
            "Path does not exist: {}",
            path.display()
        )));
    }

    let mut video_files = Vec::new();

    if path.is_file() {
        if is_video_file(path) {
            video_files.push(path.to_path_buf());
        } else {
            return Err(Error::invalid_input(format!(
                "Unsupported format: {} (supported: {})",
                path.display(),
                supported_extensions_list()
            )));
        }
    } else if path.is_dir() {
        for entry in WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_video_file(path) {
                video_files.push(path.to_path_buf());
            }
        }

        if video_files.is_empty() {
            return Err(Error::invalid_input(format!(
                "No supported video files found in directory: {}",
                path.display()
            )));
        }

        video_files.sort();
    }

    Ok(video_files)
}

pub fn is_video_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn supported_extensions_list() -> String {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_uppercase())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `~/Movies/HDR Converted` on macOS, `~/Videos/HDR Converted` elsewhere.
pub fn default_output_dir() -> PathBuf {
    dirs::video_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Videos")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(OUTPUT_FOLDER_NAME)
}

pub fn ensure_output_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(())
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let size = bytes as f64;
    let unit_index = (size.log(THRESHOLD) as usize).min(UNITS.len() - 1);
    let size_in_unit = size / THRESHOLD.powi(unit_index as i32);

    format!("{:.2} {}", size_in_unit, UNITS[unit_index])
}
