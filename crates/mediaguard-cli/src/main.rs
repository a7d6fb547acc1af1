//! mediaguard CLI
//!
//! Submits an asset to the processing pipeline and follows it to completion.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use mediaguard::config::{load_config, resolve_config_path, validate_config, Config};
use mediaguard::logging::init_logging;
use mediaguard::{
    AssetDescriptor, Job, JobStatus, MediaProcessor, ProcessingOptions, QualityPreset,
};

#[derive(Parser)]
#[command(name = "mediaguard")]
#[command(about = "Protect, encode and distribute media assets", long_about = None)]
struct Cli {
    /// Path to configuration file (JSON or YAML). Falls back to
    /// MEDIAGUARD_CONFIG, then the platform config directory.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit an asset and poll until the job finishes
    Process(ProcessArgs),

    /// Validate a configuration file
    CheckConfig,

    /// Print the effective configuration as JSON
    PrintConfig,
}

#[derive(Args)]
struct ProcessArgs {
    /// Asset file on disk; MIME type and size are taken from it
    #[arg(short, long, conflicts_with_all = ["mime", "size"])]
    file: Option<PathBuf>,

    /// MIME type of a described (not read) asset
    #[arg(long, requires = "size")]
    mime: Option<String>,

    /// Size in bytes of a described asset
    #[arg(long, requires = "mime")]
    size: Option<u64>,

    /// Skip DMCA registration
    #[arg(long)]
    no_dmca: bool,

    /// Request copyright registration
    #[arg(long)]
    copyright: bool,

    /// Quality preset: fast, balanced or high_quality
    #[arg(long, default_value = "balanced")]
    preset: QualityPreset,

    /// Output format (repeatable)
    #[arg(long = "format")]
    formats: Vec<String>,

    /// Target resolution (repeatable)
    #[arg(long = "resolution")]
    resolutions: Vec<String>,

    /// Enable AI enhancement
    #[arg(long)]
    ai: bool,

    /// Polling interval in milliseconds
    #[arg(long, default_value_t = 500)]
    poll_ms: u64,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 600)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_effective_config(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
        validate_config(&config).context("Invalid --log-level")?;
    }

    match cli.command {
        Commands::Process(args) => {
            init_logging(&config.logging)?;
            process_command(config, args).await
        }
        Commands::CheckConfig => check_config_command(cli.config.as_deref(), &config),
        Commands::PrintConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load_effective_config(explicit: Option<&Path>) -> Result<Config> {
    match resolve_config_path(explicit) {
        Some(path) => load_config(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn check_config_command(explicit: Option<&Path>, config: &Config) -> Result<()> {
    match resolve_config_path(explicit) {
        Some(path) => println!("Configuration OK: {}", path.display()),
        None => println!("No config file found, defaults are valid"),
    }
    println!(
        "  creator: {}, max concurrent jobs: {}, step delay: {}ms",
        config.pipeline.creator_ref,
        config
            .pipeline
            .max_concurrent_jobs
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unbounded".to_string()),
        config.simulation.step_delay_ms
    );
    Ok(())
}

async fn process_command(config: Config, args: ProcessArgs) -> Result<()> {
    let asset = match (&args.file, &args.mime, args.size) {
        (Some(path), _, _) => AssetDescriptor::from_path(path)?,
        (None, Some(mime), Some(size)) => AssetDescriptor::new(mime.as_str(), size),
        _ => bail!("Provide either --file or both --mime and --size"),
    };

    let mut options = ProcessingOptions {
        quality_preset: args.preset,
        output_formats: args.formats,
        resolutions: args.resolutions,
        enable_ai_enhancement: args.ai,
        ..ProcessingOptions::default()
    };
    options.protection.dmca_protection = !args.no_dmca;
    options.protection.copyright_registration = args.copyright;

    let processor = MediaProcessor::simulated(config)?;
    let job = processor.process_media(asset, options)?;
    tracing::info!("Submitted job {}", job.id);

    let poll_interval = Duration::from_millis(args.poll_ms.max(1));
    let job = follow(&processor, &job.id, poll_interval, args.timeout_secs).await?;

    println!("{}", serde_json::to_string_pretty(&job)?);

    match job.status {
        JobStatus::Completed => Ok(()),
        JobStatus::Failed => bail!(
            "Job {} failed: {}",
            job.id,
            job.error.as_deref().unwrap_or("unknown error")
        ),
        other => bail!("Job {} still {} after {}s", job.id, other, args.timeout_secs),
    }
}

/// Polls the job, printing a line whenever progress or stage changes.
async fn follow(
    processor: &MediaProcessor,
    job_id: &str,
    poll_interval: Duration,
    timeout_secs: u64,
) -> Result<Job> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(timeout_secs);
    let mut last_line = String::new();

    loop {
        let job = processor
            .get_job(job_id)
            .with_context(|| format!("Job {} disappeared", job_id))?;

        let stage = job
            .current_stage()
            .map(|s| format!("{} {}%", s.name, s.progress))
            .unwrap_or_else(|| job.status.to_string());
        let line = format!("[{:>3}%] {}", job.overall_progress, stage);
        if line != last_line {
            eprintln!("{}", line);
            last_line = line;
        }

        if job.is_finished() || tokio::time::Instant::now() >= deadline {
            return Ok(job);
        }
        tokio::time::sleep(poll_interval).await;
    }
}
