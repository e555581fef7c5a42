use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tagls::aws::{regions::parse_region_args, AwsTaggingFactory};
use tagls::config::Config;
use tagls::resource::fetch_regions;
use tagls::ui::{self, OutputFormat};
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// List tagged AWS resources across regions
#[derive(Parser, Debug)]
#[command(name = "tagls", version, about, long_about = None)]
struct Args {
    /// Region to crawl (repeatable or comma-separated)
    #[arg(short, long = "region", value_name = "REGION")]
    regions: Vec<String>,

    /// Crawl every commercial region
    #[arg(long, conflicts_with = "regions")]
    all_regions: bool,

    /// AWS profile to use
    #[arg(short, long)]
    profile: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Resources requested per page (1-100)
    #[arg(long)]
    page_size: Option<i32>,

    /// Regions collected at the same time
    #[arg(long)]
    concurrency: Option<usize>,

    /// Only list these resource types, e.g. ec2:instance (repeatable)
    #[arg(long = "resource-type", value_name = "TYPE")]
    resource_types: Vec<String>,

    /// Fail on the first ARN that cannot be parsed instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("tagls {} started with log level: {:?}", tagls::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("tagls").join("tagls.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".tagls").join("tagls.log");
    }
    PathBuf::from("tagls.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // CLI > config
    if args.profile.is_some() {
        config.profile = args.profile.clone();
    }
    config.page_size = args.page_size.or(config.page_size);
    config.concurrency = args.concurrency.or(config.concurrency);
    config.strict |= args.strict;
    if !args.resource_types.is_empty() {
        config.resource_type_filters = args.resource_types.clone();
    }

    let regions = config.effective_regions(&parse_region_args(&args.regions), args.all_regions);
    let options = config.collect_options()?;

    tracing::info!(
        "Regions: {:?}, profile: {}",
        regions,
        config.profile.as_deref().unwrap_or("default")
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling collection");
            on_interrupt.cancel();
        }
    });

    let factory = AwsTaggingFactory::new(config.profile.clone());
    let collection = fetch_regions(&factory, &regions, &options, &cancel).await?;

    let output = ui::render(&collection.records, args.output)?;
    std::io::stdout()
        .lock()
        .write_all(output.as_bytes())
        .context("Failed to write output")?;

    eprintln!(
        "{}",
        ui::summary(
            collection.records.len(),
            collection.regions.len(),
            collection.skipped
        )
    );

    Ok(())
}
