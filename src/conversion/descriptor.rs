//! Output naming and the encoder command line.
//!
//! The colour triplet (BT.2020 primaries, ARIB STD-B67 transfer, BT.2020
//! non-constant-luminance matrix) and the `hvc1` tag are what Apple players
//! look for before showing the HDR badge. The pixels are not tone-mapped; only
//! the stream is re-encoded to 10-bit HEVC and tagged.

use super::request::{ConversionRequest, QualityOverride};
use crate::config::Config;
use crate::utils::{default_output_dir, is_video_file, supported_extensions_list, Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

const X265_HDR_PARAMS: &str = "hdr-opt=1:repeat-headers=1:colorprim=bt2020:transfer=arib-std-b67:colormatrix=bt2020nc:atc-sei=18:pic-struct=0";

/// Per-process encoding defaults shared by every job.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingSettings {
    pub video_bitrate: String,
    pub audio_bitrate: String,
    pub output_suffix: String,
    pub output_extension: String,
    pub output_dir: PathBuf,
}

impl EncodingSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            video_bitrate: config.encoding.video_bitrate.clone(),
            audio_bitrate: config.encoding.audio_bitrate.clone(),
            output_suffix: config.output.suffix.clone(),
            output_extension: config.output.extension.clone(),
            output_dir: config
                .output
                .directory
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(default_output_dir),
        }
    }
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The ordered encoder argument list. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionArguments(Vec<String>);

impl ConversionArguments {
    fn new(
        input: &Path,
        output: &Path,
        quality: Option<&QualityOverride>,
        settings: &EncodingSettings,
    ) -> Self {
        let quality_args = quality
            .map(QualityOverride::to_args)
            .unwrap_or_else(|| ["-b:v".to_string(), settings.video_bitrate.clone()]);

        let mut args: Vec<String> = vec!["-y".into(), "-i".into(), input.to_string_lossy().into()];
        args.extend(["-c:v", "libx265"].map(String::from));
        args.extend(quality_args);
        args.extend(
            [
                "-pix_fmt",
                "yuv420p10le",
                "-color_primaries",
                "bt2020",
                "-colorspace",
                "bt2020nc",
                "-color_trc",
                "arib-std-b67",
                "-x265-params",
                X265_HDR_PARAMS,
                "-tag:v",
                "hvc1",
                "-c:a",
                "aac",
                "-b:a",
            ]
            .map(String::from),
        );
        args.push(settings.audio_bitrate.clone());
        args.extend(["-progress", "pipe:1", "-nostats"].map(String::from));
        args.push(output.to_string_lossy().into());

        Self(args)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ConversionArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|arg| {
                if arg.contains(' ') {
                    format!("\"{}\"", arg)
                } else {
                    arg.clone()
                }
            })
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}

/// Everything needed to launch one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescriptor {
    pub input: PathBuf,
    pub output: PathBuf,
    pub arguments: ConversionArguments,
}

impl JobDescriptor {
    pub fn build(request: &ConversionRequest, settings: &EncodingSettings) -> Result<Self> {
        Self::build_excluding(request, settings, &|_: &Path| false)
    }

    /// Like [`JobDescriptor::build`], but also numbers past any output name for
    /// which `is_claimed` is true, as if a file of that name already existed.
    pub fn build_excluding(
        request: &ConversionRequest,
        settings: &EncodingSettings,
        is_claimed: &dyn Fn(&Path) -> bool,
    ) -> Result<Self> {
        validate_input(&request.input)?;
        if let Some(quality) = &request.quality {
            quality.validate()?;
        }

        let output_dir = request
            .output_dir
            .clone()
            .unwrap_or_else(|| settings.output_dir.clone());
        let output = resolve_output_path(&request.input, &output_dir, settings, is_claimed)?;
        let arguments =
            ConversionArguments::new(&request.input, &output, request.quality.as_ref(), settings);

        Ok(Self {
            input: request.input.clone(),
            output,
            arguments,
        })
    }
}

pub fn validate_input(input: &Path) -> Result<()> {
    if !input.exists() {
        return Err(Error::invalid_input(format!(
            "File not found: {}",
            input.display()
        )));
    }

    if !input.is_file() {
        return Err(Error::invalid_input(format!(
            "Not a file: {}",
            input.display()
        )));
    }

    if !is_video_file(input) {
        let extension = input
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_else(|| "(none)".to_string());
        return Err(Error::invalid_input(format!(
            "Unsupported format: {} (supported: {})",
            extension,
            supported_extensions_list()
        )));
    }

    Ok(())
}

/// `{stem}{suffix}.{extension}` inside `output_dir`, numbered `_1`, `_2`, ...
/// when a file of that name already exists.
fn resolve_output_path(
    input: &Path,
    output_dir: &Path,
    settings: &EncodingSettings,
    is_claimed: &dyn Fn(&Path) -> bool,
) -> Result<PathBuf> {
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(Error::path(format!(
            "Output location is not a directory: {}",
            output_dir.display()
        )));
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let base = format!("{}{}", stem, settings.output_suffix);
    let extension = &settings.output_extension;

    let mut candidate = output_dir.join(format!("{}.{}", base, extension));
    let mut counter = 1;
    loop {
        match std::fs::metadata(&candidate) {
            Ok(metadata) if metadata.is_dir() => {
                return Err(Error::path(format!(
                    "Output path exists and is a directory: {}",
                    candidate.display()
                )));
            }
            Ok(_) => {}
            Err(_) if !is_claimed(&candidate) => return Ok(candidate),
            Err(_) => {}
        }
        candidate = output_dir.join(format!("{}_{}.{}", base, counter, extension));
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    fn settings_for(dir: &TempDir) -> EncodingSettings {
        EncodingSettings {
            output_dir: dir.path().join("out"),
            ..EncodingSettings::default()
        }
    }

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"video").unwrap();
        path
    }

    #[test]
    fn test_output_name_for_every_supported_extension() {
        let dir = tempdir().unwrap();
        let settings = settings_for(&dir);

        for ext in crate::utils::SUPPORTED_EXTENSIONS {
            let input = touch(&dir, &format!("clip.{}", ext));
            let descriptor = JobDescriptor::build(&ConversionRequest::new(&input), &settings).unwrap();

            assert_eq!(
                descriptor.output,
                dir.path().join("out").join("clip_HDR.mp4")
            );
            assert_ne!(descriptor.output, input);
        }
    }

    #[test]
    fn test_uppercase_extension_is_accepted() {
        let dir = tempdir().unwrap();
        let input = touch(&dir, "IMG_0001.MOV");
        let descriptor =
            JobDescriptor::build(&ConversionRequest::new(&input), &settings_for(&dir)).unwrap();
        assert!(descriptor.output.ends_with("IMG_0001_HDR.mp4"));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let dir = tempdir().unwrap();
        let input = touch(&dir, "notes.txt");
        let result = JobDescriptor::build(&ConversionRequest::new(&input), &settings_for(&dir));
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_missing_input_rejected() {
        let dir = tempdir().unwrap();
        let result = JobDescriptor::build(
            &ConversionRequest::new(dir.path().join("missing.mp4")),
            &settings_for(&dir),
        );
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_directory_input_rejected() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("folder.mp4");
        std::fs::create_dir(&folder).unwrap();
        let result = JobDescriptor::build(&ConversionRequest::new(&folder), &settings_for(&dir));
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn test_fixed_argument_order() {
        let dir = tempdir().unwrap();
        let input = touch(&dir, "clip.mov");
        let descriptor =
            JobDescriptor::build(&ConversionRequest::new(&input), &settings_for(&dir)).unwrap();

        let input_str = input.to_string_lossy().to_string();
        let output_str = descriptor.output.to_string_lossy().to_string();
        let expected: Vec<&str> = vec![
            "-y",
            "-i",
            &input_str,
            "-c:v",
            "libx265",
            "-b:v",
            "35M",
            "-pix_fmt",
            "yuv420p10le",
            "-color_primaries",
            "bt2020",
            "-colorspace",
            "bt2020nc",
            "-color_trc",
            "arib-std-b67",
            "-x265-params",
            "hdr-opt=1:repeat-headers=1:colorprim=bt2020:transfer=arib-std-b67:colormatrix=bt2020nc:atc-sei=18:pic-struct=0",
            "-tag:v",
            "hvc1",
            "-c:a",
            "aac",
            "-b:a",
            "256k",
            "-progress",
            "pipe:1",
            "-nostats",
            &output_str,
        ];

        assert_eq!(descriptor.arguments.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_build_is_deterministic() {
        let dir = tempdir().unwrap();
        let input = touch(&dir, "clip.mkv");
        let request = ConversionRequest::new(&input).with_quality(QualityOverride::Crf(18));
        let settings = settings_for(&dir);

        let first = JobDescriptor::build(&request, &settings).unwrap();
        let second = JobDescriptor::build(&request, &settings).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.arguments.to_string(), second.arguments.to_string());
    }

    #[test]
    fn test_quality_override_replaces_bitrate() {
        let dir = tempdir().unwrap();
        let input = touch(&dir, "clip.mp4");
        let request = ConversionRequest::new(&input).with_quality(QualityOverride::Crf(20));
        let args = JobDescriptor::build(&request, &settings_for(&dir))
            .unwrap()
            .arguments;

        let args: Vec<&str> = args.iter().collect();
        assert!(args.windows(2).any(|w| w == ["-crf", "20"]));
        assert!(!args.contains(&"-b:v"));
    }

    #[test]
    fn test_invalid_quality_override_rejected() {
        let dir = tempdir().unwrap();
        let input = touch(&dir, "clip.mp4");
        let request = ConversionRequest::new(&input).with_quality(QualityOverride::Crf(70));
        assert!(matches!(
            JobDescriptor::build(&request, &settings_for(&dir)),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_existing_output_is_numbered() {
        let dir = tempdir().unwrap();
        let input = touch(&dir, "clip.mp4");
        touch(&dir, "clip_HDR.mp4");
        touch(&dir, "clip_HDR_1.mp4");

        let request = ConversionRequest::new(&input).with_output_dir(dir.path());
        let descriptor = JobDescriptor::build(&request, &settings_for(&dir)).unwrap();
        assert_eq!(descriptor.output, dir.path().join("clip_HDR_2.mp4"));
    }

    #[test]
    fn test_claimed_output_is_numbered() {
        let dir = tempdir().unwrap();
        let input = touch(&dir, "clip.mov");
        let settings = settings_for(&dir);
        let taken = dir.path().join("out").join("clip_HDR.mp4");

        let descriptor = JobDescriptor::build_excluding(
            &ConversionRequest::new(&input),
            &settings,
            &|path: &Path| path == taken.as_path(),
        )
        .unwrap();
        assert_eq!(descriptor.output, dir.path().join("out").join("clip_HDR_1.mp4"));
        assert_eq!(
            JobDescriptor::build(&ConversionRequest::new(&input), &settings)
                .unwrap()
                .output,
            taken
        );
    }

    #[test]
    fn test_output_colliding_with_directory_rejected() {
        let dir = tempdir().unwrap();
        let input = touch(&dir, "clip.mp4");
        std::fs::create_dir(dir.path().join("clip_HDR.mp4")).unwrap();

        let request = ConversionRequest::new(&input).with_output_dir(dir.path());
        assert!(matches!(
            JobDescriptor::build(&request, &settings_for(&dir)),
            Err(Error::Path { .. })
        ));
    }

    #[test]
    fn test_output_dir_that_is_a_file_rejected() {
        let dir = tempdir().unwrap();
        let input = touch(&dir, "clip.mp4");
        let not_a_dir = touch(&dir, "target");

        let request = ConversionRequest::new(&input).with_output_dir(not_a_dir);
        assert!(matches!(
            JobDescriptor::build(&request, &settings_for(&dir)),
            Err(Error::Path { .. })
        ));
    }

    #[test]
    fn test_configured_suffix_and_extension() {
        let dir = tempdir().unwrap();
        let input = touch(&dir, "clip.avi");
        let settings = EncodingSettings {
            output_suffix: "_HLG".to_string(),
            output_extension: "mov".to_string(),
            ..settings_for(&dir)
        };
        let descriptor = JobDescriptor::build(&ConversionRequest::new(&input), &settings).unwrap();
        assert!(descriptor.output.ends_with("clip_HLG.mov"));
    }
}
