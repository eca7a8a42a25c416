use super::descriptor::{EncodingSettings, JobDescriptor};
use super::job::{Completion, JobHandle, JobId, JobState};
use super::progress::{ConversionProgress, MonotonicProgress, ProgressParser};
use super::registry::JobRegistry;
use super::request::ConversionRequest;
use crate::capability::{CapabilityProbe, CapabilityReport};
use crate::config::{Config, RunnerConfig};
use crate::utils::logging::{log_conversion_complete, log_conversion_start};
use crate::utils::{ensure_output_dir, Error, FfmpegWrapper, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub job_id: JobId,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub elapsed: Duration,
}

/// Success with the converted file, or the reason the job did not produce one.
pub type ConversionResult = Result<ConversionOutput>;

#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub cancel_grace: Duration,
    pub stderr_tail_lines: usize,
}

impl RunnerOptions {
    pub fn from_config(runner: &RunnerConfig) -> Self {
        Self {
            cancel_grace: Duration::from_millis(runner.cancel_grace_ms),
            stderr_tail_lines: runner.stderr_tail_lines.max(1),
        }
    }
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::from_config(&RunnerConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct ConversionRunner {
    ffmpeg: FfmpegWrapper,
    settings: EncodingSettings,
    options: RunnerOptions,
    required_encoders: Vec<String>,
}

impl ConversionRunner {
    pub fn new(ffmpeg: FfmpegWrapper, settings: EncodingSettings, options: RunnerOptions) -> Self {
        Self {
            ffmpeg,
            settings,
            options,
            required_encoders: crate::config::ToolsConfig::default().required_encoders,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            ffmpeg: FfmpegWrapper::from_config(&config.tools, config.runner.probe_timeout_secs),
            settings: EncodingSettings::from_config(config),
            options: RunnerOptions::from_config(&config.runner),
            required_encoders: config.tools.required_encoders.clone(),
        }
    }

    pub fn ffmpeg(&self) -> &FfmpegWrapper {
        &self.ffmpeg
    }

    pub fn settings(&self) -> &EncodingSettings {
        &self.settings
    }

    pub async fn probe_capabilities(&self) -> CapabilityReport {
        CapabilityProbe::new(self.ffmpeg.ffmpeg_path(), self.required_encoders.clone())
            .probe()
            .await
    }

    /// Capability check meant to run once before any job is accepted.
    pub async fn preflight(&self) -> Result<CapabilityReport> {
        let report = self.probe_capabilities().await;
        if !report.available {
            return Err(Error::capability(report.reason));
        }
        Ok(report)
    }

    /// Validates the request and creates a job in the `Created` state.
    pub fn prepare(&self, request: &ConversionRequest) -> Result<ConversionJob> {
        self.prepare_excluding(request, &|_: &Path| false)
    }

    /// Prepares a job and registers it. Concurrent jobs with the same file
    /// stem get distinct numbered outputs.
    pub fn prepare_registered(
        &self,
        request: &ConversionRequest,
        registry: &JobRegistry,
    ) -> Result<ConversionJob> {
        registry.register_with(|is_claimed| self.prepare_excluding(request, is_claimed))
    }

    fn prepare_excluding(
        &self,
        request: &ConversionRequest,
        is_claimed: &dyn Fn(&Path) -> bool,
    ) -> Result<ConversionJob> {
        let descriptor = JobDescriptor::build_excluding(request, &self.settings, is_claimed)?;
        let handle = JobHandle::new(descriptor.input.clone(), descriptor.output.clone());

        Ok(ConversionJob {
            descriptor,
            handle,
            ffmpeg: self.ffmpeg.clone(),
            options: self.options.clone(),
        })
    }

    pub async fn run<F>(&self, request: &ConversionRequest, on_progress: F) -> ConversionResult
    where
        F: FnMut(&ConversionProgress) + Send,
    {
        self.prepare(request)?.run(on_progress).await
    }
}

/// One conversion, owned by whoever drives [`ConversionJob::run`].
#[derive(Debug)]
pub struct ConversionJob {
    descriptor: JobDescriptor,
    handle: JobHandle,
    ffmpeg: FfmpegWrapper,
    options: RunnerOptions,
}

impl ConversionJob {
    pub fn id(&self) -> JobId {
        self.handle.id()
    }

    pub fn handle(&self) -> JobHandle {
        self.handle.clone()
    }

    pub fn descriptor(&self) -> &JobDescriptor {
        &self.descriptor
    }

    pub async fn run<F>(self, on_progress: F) -> ConversionResult
    where
        F: FnMut(&ConversionProgress) + Send,
    {
        let result = self.execute(on_progress).await;

        let completion = match &result {
            Ok(output) => Completion::Succeeded {
                output_size: output.size_bytes,
            },
            Err(Error::Cancelled) => Completion::Cancelled,
            Err(e) => Completion::Failed {
                error: e.to_string(),
            },
        };

        match self.handle.complete(completion) {
            JobState::Cancelled => {
                if result.is_ok() {
                    // Cancellation was accepted after the encoder had already finished
                    remove_partial_output(&self.descriptor.output);
                }
                info!("Conversion cancelled: {}", self.descriptor.input.display());
                Err(Error::Cancelled)
            }
            state => {
                match &result {
                    Ok(output) => log_conversion_complete(&output.path, output.elapsed, output.size_bytes),
                    Err(e) => debug!("Job {} ended {}: {}", self.handle.id(), state.as_str(), e),
                }
                result
            }
        }
    }

    async fn execute<F>(&self, mut on_progress: F) -> ConversionResult
    where
        F: FnMut(&ConversionProgress) + Send,
    {
        let started = Instant::now();
        let input = &self.descriptor.input;
        let output = &self.descriptor.output;
        let cancel = self.handle.cancellation();

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let total_duration = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            duration = self.ffmpeg.probe_duration(input) => duration,
        };
        let parser = ProgressParser::new(total_duration);
        if parser.total_duration().is_none() {
            warn!(
                "Could not determine duration of {}, progress will not show percentages",
                input.display()
            );
        }

        ensure_output_dir(output)?;
        log_conversion_start(input, output, &self.descriptor.arguments);

        let mut partial = PartialOutput::new(output.clone());
        let mut child = self.ffmpeg.spawn_encoder(&self.descriptor.arguments)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::ffmpeg("Encoder stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::ffmpeg("Encoder stderr was not captured"))?;
        let mut stderr_task = tokio::spawn(collect_tail(stderr, self.options.stderr_tail_lines));

        if !self.handle.mark_running() {
            terminate(&mut child, self.options.cancel_grace).await;
            stderr_task.abort();
            return Err(Error::Cancelled);
        }

        let mut monotonic = MonotonicProgress::default();
        let mut emit = |line: &str| {
            if let Some(progress) = parser.parse_line(line).and_then(|p| monotonic.advance(p)) {
                self.handle.record_progress(&progress);
                on_progress(&progress);
            }
        };

        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        let mut stdout_open = true;
        let status = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Stopping encoder for {}", input.display());
                    terminate(&mut child, self.options.cancel_grace).await;
                    stderr_task.abort();
                    return Err(Error::Cancelled);
                }
                // read_until keeps partial bytes in `buf` if another branch wins
                read = reader.read_until(b'\n', &mut buf), if stdout_open => match read {
                    Ok(0) => stdout_open = false,
                    Ok(_) => {
                        emit(&line_text(&buf));
                        buf.clear();
                    }
                    Err(e) => {
                        warn!("Failed to read encoder progress: {}", e);
                        stdout_open = false;
                    }
                },
                status = child.wait() => break status?,
            }
        };

        if stdout_open {
            let drain = async {
                while let Ok(n) = reader.read_until(b'\n', &mut buf).await {
                    if n == 0 {
                        break;
                    }
                    emit(&line_text(&buf));
                    buf.clear();
                }
            };
            if tokio::time::timeout(self.options.cancel_grace, drain).await.is_err() {
                debug!("Encoder output still open after exit, ignoring the rest");
            }
        }

        let stderr_tail = match tokio::time::timeout(self.options.cancel_grace, &mut stderr_task).await {
            Ok(Ok(tail)) => tail,
            _ => {
                stderr_task.abort();
                Vec::new()
            }
        };

        if !status.success() {
            let message = match status.code() {
                Some(code) => format!("ffmpeg exited with code {}", code),
                None => "ffmpeg was terminated by a signal".to_string(),
            };
            return Err(Error::encoding(message, stderr_tail));
        }

        let size_bytes = match tokio::fs::metadata(output).await {
            Ok(metadata) => metadata.len(),
            Err(_) => {
                return Err(Error::encoding(
                    "Conversion failed: output file not created",
                    stderr_tail,
                ))
            }
        };

        if size_bytes == 0 {
            return Err(Error::encoding(
                "Conversion failed: output file is empty",
                stderr_tail,
            ));
        }

        partial.keep();
        Ok(ConversionOutput {
            job_id: self.handle.id(),
            path: output.clone(),
            size_bytes,
            elapsed: started.elapsed(),
        })
    }
}

/// Deletes the output file on drop unless the conversion completed.
struct PartialOutput {
    path: PathBuf,
    keep: bool,
}

impl PartialOutput {
    fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    fn keep(&mut self) {
        self.keep = true;
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        if !self.keep {
            remove_partial_output(&self.path);
        }
    }
}

fn remove_partial_output(path: &std::path::Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed partial output: {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial output {}: {}", path.display(), e),
    }
}

async fn collect_tail<R>(reader: R, max_lines: usize) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut tail = VecDeque::with_capacity(max_lines);
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    while let Ok(n) = reader.read_until(b'\n', &mut buf).await {
        if n == 0 {
            break;
        }
        let line = line_text(&buf);
        buf.clear();
        if line.trim().is_empty() {
            continue;
        }
        trace!("ffmpeg: {}", line);
        if tail.len() == max_lines {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    tail.into()
}

/// One line of encoder output without its terminator. Invalid UTF-8 is replaced
/// rather than ending the stream.
fn line_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// SIGTERM first so the encoder can exit cleanly, SIGKILL after `grace`.
async fn terminate(child: &mut Child, grace: Duration) {
    if request_graceful_stop(child) {
        match tokio::time::timeout(grace, child.wait()).await {
            Ok(Ok(status)) => {
                debug!("Encoder stopped: {}", status);
                return;
            }
            Ok(Err(e)) => debug!("Waiting for encoder failed: {}", e),
            Err(_) => warn!(
                "Encoder still running {}ms after SIGTERM, killing it",
                grace.as_millis()
            ),
        }
    }

    if let Err(e) = child.kill().await {
        debug!("Failed to kill encoder: {}", e);
    }
}

#[cfg(unix)]
fn request_graceful_stop(child: &Child) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return false;
    };

    match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        Ok(()) => true,
        Err(e) => {
            debug!("Failed to send SIGTERM to encoder: {}", e);
            false
        }
    }
}

#[cfg(not(unix))]
fn request_graceful_stop(_child: &Child) -> bool {
    false
}


#[cfg(all(test, unix))]
mod process_tests {
    use super::*;
    use crate::conversion::ProgressPhase;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    const SCENARIO_ENCODER: &str = r#"for last; do :; done
for t in 02 04 06 08 10; do
  printf 'frame=%s\nout_time_us=%s000000\nout_time=00:00:%s.000000\nprogress=continue\n' "$t" "$t" "$t"
done
printf 'progress=end\n'
printf 'encoded' > "$last"
"#;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        let mut permissions = std::fs::metadata(&path).unwrap().permissions();
        permissions.set_mode(0o755);
        std::fs::set_permissions(&path, permissions).unwrap();
        path
    }

    fn runner_with(dir: &TempDir, encoder_body: &str, duration: Option<&str>) -> ConversionRunner {
        let ffmpeg = write_script(dir.path(), "fake-ffmpeg", encoder_body);
        let ffprobe = duration
            .map(|d| write_script(dir.path(), "fake-ffprobe", &format!("echo {}\n", d)));

        ConversionRunner::new(
            FfmpegWrapper::new(
                ffmpeg.to_string_lossy().to_string(),
                ffprobe.map(|p| p.to_string_lossy().to_string()),
            ),
            EncodingSettings {
                output_dir: dir.path().join("out"),
                ..EncodingSettings::default()
            },
            RunnerOptions {
                cancel_grace: Duration::from_millis(500),
                stderr_tail_lines: 20,
            },
        )
    }

    fn input_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"source video").unwrap();
        path
    }

    #[tokio::test]
    async fn test_scenario_progress_then_success() {
        let dir = tempdir().unwrap();
        let runner = runner_with(&dir, SCENARIO_ENCODER, Some("10.000000"));
        let request = ConversionRequest::new(input_file(&dir, "clip.mov"));

        let mut events = Vec::new();
        let output = runner
            .run(&request, |p| events.push(p.clone()))
            .await
            .unwrap();

        let encoding: Vec<f64> = events
            .iter()
            .filter(|p| p.phase == ProgressPhase::Encoding)
            .filter_map(|p| p.fraction)
            .collect();
        let expected = [0.2, 0.4, 0.6, 0.8, 1.0];
        assert_eq!(encoding.len(), expected.len());
        for (actual, expected) in encoding.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-6);
        }

        let fractions: Vec<f64> = events.iter().filter_map(|p| p.fraction).collect();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(events.last().map(|p| p.phase), Some(ProgressPhase::Finalizing));

        assert_eq!(output.path, dir.path().join("out").join("clip_HDR.mp4"));
        assert_eq!(output.size_bytes, 7);
        assert!(output.path.exists());
    }

    #[tokio::test]
    async fn test_job_status_after_success() {
        let dir = tempdir().unwrap();
        let runner = runner_with(&dir, SCENARIO_ENCODER, Some("10.000000"));
        let job = runner
            .prepare(&ConversionRequest::new(input_file(&dir, "clip.mp4")))
            .unwrap();
        let handle = job.handle();
        assert_eq!(handle.state(), JobState::Created);

        job.run(|_| {}).await.unwrap();

        let status = handle.status();
        assert_eq!(status.state, JobState::Succeeded);
        assert_eq!(status.fraction, Some(1.0));
        assert_eq!(status.output_size, Some(7));
        assert!(!handle.cancel());
    }

    #[tokio::test]
    async fn test_unknown_duration_reports_placeholder() {
        let dir = tempdir().unwrap();
        let runner = runner_with(&dir, SCENARIO_ENCODER, None);
        let request = ConversionRequest::new(input_file(&dir, "clip.mkv"));

        let mut events = Vec::new();
        runner
            .run(&request, |p| events.push(p.clone()))
            .await
            .unwrap();

        assert!(!events.is_empty());
        assert!(events.iter().all(|p| p.fraction.is_none()));
        assert!(events
            .iter()
            .any(|p| p.phase == ProgressPhase::Processing));
    }

    #[tokio::test]
    async fn test_zero_byte_output_is_failure() {
        let dir = tempdir().unwrap();
        let runner = runner_with(
            &dir,
            "for last; do :; done\n: > \"$last\"\nexit 0\n",
            Some("10"),
        );
        let job = runner
            .prepare(&ConversionRequest::new(input_file(&dir, "clip.mp4")))
            .unwrap();
        let handle = job.handle();
        let output = job.descriptor().output.clone();

        let result = job.run(|_| {}).await;
        assert!(matches!(result, Err(Error::Encoding { .. })));
        assert_eq!(handle.state(), JobState::Failed);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_output_is_failure() {
        let dir = tempdir().unwrap();
        let runner = runner_with(&dir, "exit 0\n", Some("10"));
        let result = runner
            .run(&ConversionRequest::new(input_file(&dir, "clip.webm")), |_| {})
            .await;
        assert!(matches!(result, Err(Error::Encoding { .. })));
    }

    #[tokio::test]
    async fn test_nonzero_exit_carries_stderr_tail() {
        let dir = tempdir().unwrap();
        let runner = runner_with(
            &dir,
            r#"for last; do :; done
printf 'partial' > "$last"
i=1
while [ $i -le 30 ]; do echo "stderr line $i" >&2; i=$((i+1)); done
exit 1
"#,
            Some("10"),
        );
        let job = runner
            .prepare(&ConversionRequest::new(input_file(&dir, "clip.avi")))
            .unwrap();
        let output = job.descriptor().output.clone();

        let err = job.run(|_| {}).await.unwrap_err();
        let tail = err.diagnostic();
        assert_eq!(tail.len(), 20);
        assert_eq!(tail[0], "stderr line 11");
        assert_eq!(tail[19], "stderr line 30");
        assert!(err.to_string().contains("code 1"));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_cancel_mid_run() {
        let dir = tempdir().unwrap();
        let runner = runner_with(
            &dir,
            r#"for last; do :; done
printf 'partial' > "$last"
printf 'out_time=00:00:01.000000\n'
exec sleep 30
"#,
            Some("10"),
        );
        let job = runner
            .prepare(&ConversionRequest::new(input_file(&dir, "clip.mov")))
            .unwrap();
        let handle = job.handle();
        let output = job.descriptor().output.clone();

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let task = tokio::spawn(job.run(move |p| {
            let _ = tx.send(p.clone());
        }));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.fraction, Some(0.1));
        assert_eq!(handle.state(), JobState::Running);

        assert!(handle.cancel());
        assert!(!handle.cancel());

        let result = tokio::time::timeout(Duration::from_secs(10), task)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(handle.state(), JobState::Cancelled);
        assert!(!output.exists());
        assert!(!handle.cancel());
    }

    #[tokio::test]
    async fn test_cancel_before_start_never_spawns() {
        let dir = tempdir().unwrap();
        let marker = dir.path().join("spawned");
        let runner = runner_with(
            &dir,
            &format!("touch '{}'\n", marker.display()),
            Some("10"),
        );
        let job = runner
            .prepare(&ConversionRequest::new(input_file(&dir, "clip.mp4")))
            .unwrap();
        let handle = job.handle();

        assert!(handle.cancel());
        let result = job.run(|_| {}).await;
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(handle.state(), JobState::Cancelled);
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_unsupported_input_never_spawns() {
        let dir = tempdir().unwrap();
        let marker = dir.path().join("spawned");
        let runner = runner_with(
            &dir,
            &format!("touch '{}'\n", marker.display()),
            Some("10"),
        );
        let result = runner
            .run(&ConversionRequest::new(input_file(&dir, "notes.txt")), |_| {})
            .await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_missing_encoder_binary() {
        let dir = tempdir().unwrap();
        let runner = ConversionRunner::new(
            FfmpegWrapper::new(
                dir.path().join("no-such-ffmpeg").to_string_lossy().to_string(),
                None,
            ),
            EncodingSettings {
                output_dir: dir.path().join("out"),
                ..EncodingSettings::default()
            },
            RunnerOptions::default(),
        );

        let result = runner
            .run(&ConversionRequest::new(input_file(&dir, "clip.mp4")), |_| {})
            .await;
        assert!(matches!(result, Err(Error::Capability { .. })));
    }

    #[tokio::test]
    async fn test_progress_continues_after_invalid_utf8() {
        let dir = tempdir().unwrap();
        let encoder = format!("printf '\\377\\376 junk\\n'\n{}", SCENARIO_ENCODER);
        let runner = runner_with(&dir, &encoder, Some("10"));

        let mut fractions = Vec::new();
        let output = runner
            .run(&ConversionRequest::new(input_file(&dir, "clip.mov")), |p| {
                if p.phase == ProgressPhase::Encoding {
                    fractions.extend(p.fraction);
                }
            })
            .await
            .unwrap();

        let expected = [0.2, 0.4, 0.6, 0.8, 1.0];
        assert_eq!(fractions.len(), expected.len());
        for (actual, expected) in fractions.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-6);
        }
        assert!(output.path.ends_with("clip_HDR.mp4"));
    }

    #[tokio::test]
    async fn test_same_stem_concurrent_jobs_get_distinct_outputs() {
        let dir = tempdir().unwrap();
        let runner = runner_with(&dir, SCENARIO_ENCODER, Some("10"));
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();
        let first_input = input_file(&dir, "a/clip.mov");
        let second_input = input_file(&dir, "b/clip.mov");

        let registry = JobRegistry::new();
        let first = runner
            .prepare_registered(&ConversionRequest::new(first_input), &registry)
            .unwrap();
        let second = runner
            .prepare_registered(&ConversionRequest::new(second_input), &registry)
            .unwrap();

        let (a, b) = tokio::join!(first.run(|_| {}), second.run(|_| {}));
        let mut names: Vec<String> = [a.unwrap(), b.unwrap()]
            .iter()
            .map(|output| output.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["clip_HDR.mp4", "clip_HDR_1.mp4"]);
        assert!(registry
            .statuses()
            .iter()
            .all(|status| status.state == JobState::Succeeded));
    }

    #[tokio::test]
    async fn test_concurrent_jobs_are_independent() {
        let dir = tempdir().unwrap();
        let runner = runner_with(&dir, SCENARIO_ENCODER, Some("10"));
        let first = runner
            .prepare(&ConversionRequest::new(input_file(&dir, "a.mp4")))
            .unwrap();
        let second = runner
            .prepare(&ConversionRequest::new(input_file(&dir, "b.mov")))
            .unwrap();

        let (a, b) = tokio::join!(first.run(|_| {}), second.run(|_| {}));
        assert!(a.unwrap().path.ends_with("a_HDR.mp4"));
        assert!(b.unwrap().path.ends_with("b_HDR.mp4"));
    }
}
