use clap::Parser;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use hdr_converter::{
    cli::{handle_commands, CliArgs},
    config::Config,
    conversion::{ConversionRequest, ConversionResult, ConversionRunner, JobRegistry},
    utils::{
        find_video_files, logging::log_batch_summary, setup_logging, supported_extensions_list,
        Error, ProgressMonitor, Result,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    if !args.is_info_command() && args.inputs.is_empty() {
        use clap::CommandFactory;
        let mut cmd = CliArgs::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    }

    args.validate()?;

    let config = Config::load_with_fallback(&args.config)?;

    setup_logging(
        args.get_log_level(&config.logging.level),
        config.logging.show_timestamps,
        config.logging.colored_output && args.should_use_color(),
    )?;

    if handle_commands(&args, &config).await? {
        return Ok(());
    }

    if args.should_convert() {
        handle_conversion(&args, &config).await
    } else {
        Ok(())
    }
}

async fn handle_conversion(args: &CliArgs, config: &Config) -> Result<()> {
    let runner = ConversionRunner::from_config(config);
    runner.preflight().await?;

    let mut video_files = Vec::new();
    for input_path in &args.inputs {
        let mut files = find_video_files(input_path)?;
        video_files.append(&mut files);
    }

    if video_files.is_empty() {
        return Err(Error::invalid_input(format!(
            "No supported video files found (supported: {})",
            supported_extensions_list()
        )));
    }
    info!("Found {} video file(s) to convert", video_files.len());

    let registry = Arc::new(JobRegistry::new());
    let shutdown = CancellationToken::new();
    let interrupt = tokio::spawn({
        let registry = Arc::clone(&registry);
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling running conversions");
                shutdown.cancel();
                registry.cancel_all();
            }
        }
    });

    let show_bars = !args.json && console::Term::stderr().is_term();
    let monitor = ProgressMonitor::new(show_bars);

    let requests: Vec<ConversionRequest> = video_files
        .into_iter()
        .map(|input| build_request(args, input))
        .collect();

    let outcomes: Vec<(PathBuf, ConversionResult)> = stream::iter(requests)
        .map(|request| {
            let runner = &runner;
            let registry = &registry;
            let monitor = &monitor;
            let shutdown = &shutdown;
            let keep_finished = args.json;
            async move {
                let result =
                    convert_one(runner, registry, monitor, shutdown, &request, keep_finished).await;
                (request.input, result)
            }
        })
        .buffer_unordered(args.jobs)
        .collect()
        .await;

    interrupt.abort();

    let mut succeeded = 0;
    let mut cancelled = 0;
    let mut failed = Vec::new();
    for (input, result) in outcomes {
        match result {
            Ok(_) => succeeded += 1,
            Err(Error::Cancelled) => cancelled += 1,
            Err(e) => {
                error!("Conversion failed for {}: {}", input.display(), e);
                for line in e.diagnostic() {
                    error!("  {}", line);
                }
                failed.push((input, e.to_string()));
            }
        }
    }

    log_batch_summary(succeeded, failed.len(), cancelled);

    if args.json {
        let statuses = registry.statuses();
        // Inputs that failed before a job was registered
        let rejected: Vec<serde_json::Value> = failed
            .iter()
            .filter(|(input, _)| !statuses.iter().any(|s| &s.input == input))
            .map(|(input, error)| serde_json::json!({ "input": input, "error": error }))
            .collect();
        let report = serde_json::json!({
            "jobs": statuses,
            "rejected": rejected,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if succeeded == 0 && !failed.is_empty() {
        return Err(Error::encoding("All conversions failed", Vec::new()));
    }

    if shutdown.is_cancelled() {
        return Err(Error::Cancelled);
    }

    Ok(())
}

fn build_request(args: &CliArgs, input: PathBuf) -> ConversionRequest {
    let mut request = ConversionRequest::new(input);
    if let Some(dir) = &args.output_dir {
        request = request.with_output_dir(dir.clone());
    }
    if let Some(quality) = args.quality_override() {
        request = request.with_quality(quality);
    }
    request
}

async fn convert_one(
    runner: &ConversionRunner,
    registry: &JobRegistry,
    monitor: &ProgressMonitor,
    shutdown: &CancellationToken,
    request: &ConversionRequest,
    keep_finished: bool,
) -> ConversionResult {
    if shutdown.is_cancelled() {
        return Err(Error::Cancelled);
    }

    // Prepared lazily so sequential jobs see earlier outputs when picking a name
    let job = runner.prepare_registered(request, registry)?;
    let id = job.id();
    if shutdown.is_cancelled() {
        job.handle().cancel();
    }

    let progress = monitor.add_job(request.input());
    let result = job.run(|update| progress.update(update)).await;

    match &result {
        Ok(output) => progress.finish_success(output.size_bytes),
        Err(Error::Cancelled) => progress.finish_cancelled(),
        Err(e) => progress.finish_failed(&e.to_string()),
    }

    // Finished jobs are only needed for the --json report
    if !keep_finished {
        registry.remove(id);
    }

    result
}
