//! # Delve Command Line
//!
//! Generates one dungeon level and prints it as ASCII or JSON.

use clap::{Parser, ValueEnum};
use delve::{
    generate_with_kind, DelveResult, GenerationConfig, GeneratorKind, Layout, LayoutBuilder,
};
use log::info;
use std::path::PathBuf;

/// Output formats for the generated level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// `#` walls and `.` floor
    Ascii,
    /// Full layout including rooms and tokens
    Json,
}

/// Command line arguments for the Delve generator.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Generate grid dungeon levels for roguelikes")]
#[command(version)]
struct Args {
    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generation strategy
    #[arg(short, long, value_enum)]
    generator: Option<GeneratorKind>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<u32>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<u32>,

    /// Random seed for reproducible levels
    #[arg(short, long)]
    seed: Option<u64>,

    /// Level identifier passed to the builder
    #[arg(long, default_value = delve::config::DEFAULT_LEVEL_ID)]
    id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "ascii")]
    format: Format,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> DelveResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting Delve v{}", delve::VERSION);

    let config = build_config(&args)?;
    let mut rng = config.source();
    let layout = generate_with_kind(&config, &args.id, &mut rng, &mut LayoutBuilder)?;

    let rendered = render(&layout, args.format)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!("Wrote level '{}' to {}", layout.id, path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        let level = match log_level.to_lowercase().as_str() {
            "error" => tracing::Level::ERROR,
            "warn" => tracing::Level::WARN,
            "info" => tracing::Level::INFO,
            "debug" => tracing::Level::DEBUG,
            "trace" => tracing::Level::TRACE,
            _ => tracing::Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .format_target(false)
            .init();
    }
}

/// Merges the optional config file with command line overrides.
fn build_config(args: &Args) -> DelveResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::load(path)?,
        None => GenerationConfig::default(),
    };

    if let Some(generator) = args.generator {
        config.generator = generator;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    config.validate()?;
    Ok(config)
}

fn render(layout: &Layout, format: Format) -> DelveResult<String> {
    match format {
        Format::Ascii => Ok(layout.to_ascii()),
        Format::Json => {
            let mut json = layout.to_json()?;
            json.push('\n');
            Ok(json)
        }
    }
}
