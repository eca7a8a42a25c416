use crate::{
    cli::CliArgs,
    config::Config,
    conversion::ConversionRunner,
    utils::{Error, HdrVerification, Result},
};
use console::style;
use std::path::Path;

/// Runs the informational commands. Returns `true` when one was handled.
pub async fn handle_commands(args: &CliArgs, config: &Config) -> Result<bool> {
    if args.check {
        check_encoder(config, args.json).await?;
        return Ok(true);
    }

    if let Some(path) = &args.verify {
        verify_file(config, path, args.json).await?;
        return Ok(true);
    }

    Ok(false)
}

async fn check_encoder(config: &Config, json: bool) -> Result<()> {
    let runner = ConversionRunner::from_config(config);
    let report = runner.probe_capabilities().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Encoder:  {}", report.encoder_path);
        println!(
            "Version:  {}",
            report.version.as_deref().unwrap_or("unknown")
        );
        println!(
            "ffprobe:  {}",
            runner.ffmpeg().ffprobe_path().unwrap_or("not found")
        );
        if report.available {
            println!("{} Ready to convert", style("✓").green());
        } else {
            println!("{} {}", style("✗").red(), report.reason);
        }
    }

    if report.available {
        Ok(())
    } else {
        Err(Error::capability(report.reason))
    }
}

async fn verify_file(config: &Config, path: &Path, json: bool) -> Result<()> {
    if !path.is_file() {
        return Err(Error::invalid_input(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let runner = ConversionRunner::from_config(config);
    let verification = runner.ffmpeg().verify_hdr_metadata(path).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&verification)?);
    } else {
        print_verification(path, &verification);
    }

    Ok(())
}

fn print_verification(path: &Path, verification: &HdrVerification) {
    println!("{}", path.display());
    println!("{:-<40}", "");
    println!("Color primaries: {}", verification.color_primaries);
    println!("Color transfer:  {}", verification.color_transfer);
    println!("Color space:     {}", verification.color_space);
    println!("Pixel format:    {}", verification.pixel_format);
    println!("{:-<40}", "");

    if verification.is_hdr {
        println!("{} HLG HDR metadata present", style("✓").green());
    } else {
        println!("{} No HLG transfer tag found", style("✗").red());
    }
}
