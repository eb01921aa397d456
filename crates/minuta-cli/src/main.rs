//! CLI and HTTP service for notarial draft generation.

mod commands;
mod server;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use minuta_core::MinutaConfig;

use commands::{catalog, config, generate, serve};

/// Minuta - fill notarial draft templates from uploaded PDF documents
#[derive(Parser)]
#[command(name = "minuta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve(serve::ServeArgs),

    /// Generate a draft PDF from local files
    Generate(generate::GenerateArgs),

    /// Inspect the placeholder catalog
    Catalog(catalog::CatalogArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => serve::run(args, load_config(config_path)?).await,
        Commands::Generate(args) => generate::run(args, load_config(config_path)?).await,
        Commands::Catalog(args) => catalog::run(args, load_config(config_path)?).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}

/// Load the given config file, else the default one if present, else defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<MinutaConfig> {
    if let Some(path) = path {
        return MinutaConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path.display(), e));
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        tracing::debug!("Using config file {}", default_path.display());
        return Ok(MinutaConfig::from_file(&default_path)?);
    }

    Ok(MinutaConfig::default())
}
