use clap::{Parser, Subcommand};
use osm_history::commands;
use osm_history::commands::download::DownloadOverrides;
use osm_history::config;
use osm_history::data_provider::OsmDataProvider;
use osm_history::earth_osm::EarthOsmCommand;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// Default Configuration Constants
/// Default log level when not specified
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log destination ("-" is stderr)
const DEFAULT_LOG_FILE: &str = "-";

#[derive(Parser)]
#[command(name = "osm-history")]
#[command(about = "Download OSM power infrastructure data, optionally as of a past date")]
struct Cli {
    /// Set log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    /// Log file path ("-" for stderr)
    #[arg(short = 'F', long, global = true, default_value = DEFAULT_LOG_FILE)]
    log_file: String,

    /// Config file (defaults to $XDG_CONFIG_HOME/osm-history/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use the in-memory mock provider instead of earth_osm
    #[cfg(feature = "development")]
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download OSM data, historical if a date is requested and supported
    Download {
        /// Snapshot date in YYYY-MM-DD format (overrides historical_data.osm_date)
        #[arg(short = 'd', long)]
        osm_date: Option<String>,

        /// Region to download (repeatable, overrides download.regions)
        #[arg(short, long = "region")]
        regions: Vec<String>,

        /// Feature to extract (repeatable, overrides download.features)
        #[arg(short, long = "feature")]
        features: Vec<String>,

        /// Output directory (overrides download.out_dir)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
    /// Check the historical date configuration and provider support
    Check,
    /// Display current configuration
    Config,
}

fn init_logging(log_level: &str, log_file: &str) {
    let filter = EnvFilter::try_new(log_level.to_lowercase())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);

    let result = if log_file == DEFAULT_LOG_FILE {
        builder.with_writer(std::io::stderr).try_init()
    } else {
        let file = match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
        {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", log_file, e);
                return;
            }
        };
        builder.with_writer(std::sync::Mutex::new(file)).try_init()
    };
    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Resolve log configuration from CLI args and config file
/// CLI arguments take precedence over config file
fn resolve_log_config<'a>(cli: &'a Cli, config: &'a config::Config) -> (&'a str, &'a str) {
    let log_level = if cli.log_level != DEFAULT_LOG_LEVEL {
        cli.log_level.as_str()
    } else {
        config.log_level.as_str()
    };

    let log_file = if cli.log_file != DEFAULT_LOG_FILE {
        cli.log_file.as_str()
    } else {
        config.log_file.as_str()
    };

    (log_level, log_file)
}

/// Handle the config command - display current configuration
fn handle_config_command(cli: &Cli, cfg: &config::Config) {
    let (path_str, exists) = match cli.config.clone().or_else(config::get_config_path) {
        Some(path) => {
            let exists = path.exists();
            (path.display().to_string(), exists)
        }
        None => ("Unable to determine config path".to_string(), false),
    };

    println!("Configuration File: {} (Exists: {})", path_str, if exists { "yes" } else { "no" });
    println!();
    println!("Current Configuration:");
    println!("=====================");
    println!("log_level: {}", cfg.log_level);
    println!("log_file: {}", cfg.log_file);
    println!();
    println!("[historical_data]");
    println!("osm_date: {}", cfg.historical_data.osm_date.as_deref().unwrap_or("(latest)"));
    println!();
    println!("[download]");
    println!("command: {}", cfg.download.command);
    println!("capability: {}", cfg.download.capability);
    println!("primary_name: {}", cfg.download.primary_name);
    println!("regions: {}", cfg.download.regions.join(", "));
    println!("features: {}", cfg.download.features.join(", "));
    println!("data_dir: {}", cfg.download.data_dir.display());
    println!("out_dir: {}", cfg.download.out_dir.display());
    println!("out_format: {}", cfg.download.out_format.join(", "));
    println!("out_aggregate: {}", cfg.download.out_aggregate);
    println!("update: {}", cfg.download.update);
    println!("parallel: {}", cfg.download.parallel);
}

fn create_provider(cli: &Cli, cfg: &config::Config) -> Box<dyn OsmDataProvider> {
    #[cfg(feature = "development")]
    if cli.mock {
        return Box::new(osm_history::dev::mock_provider::MockProvider::historical());
    }
    #[cfg(not(feature = "development"))]
    let _ = cli;

    Box::new(EarthOsmCommand::new(
        cfg.download.command.clone(),
        cfg.download.capability,
    ))
}

/// Execute a CLI command by routing it to the appropriate command handler
async fn execute_command(cli: Cli, cfg: config::Config) -> anyhow::Result<()> {
    let provider = create_provider(&cli, &cfg);
    match cli.command {
        Commands::Config => unreachable!("Config command should be handled before execute_command"),
        Commands::Download { osm_date, regions, features, out_dir } => {
            let overrides = DownloadOverrides { osm_date, regions, features, out_dir };
            commands::download::run(provider.as_ref(), &cfg, overrides).await?;
            Ok(())
        }
        Commands::Check => {
            if !commands::check::run(provider.as_ref(), &cfg).await? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let cfg = match config::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {:#}", anyhow::Error::from(e));
            std::process::exit(1);
        }
    };

    // Resolve and initialize logging
    let (log_level, log_file) = resolve_log_config(&cli, &cfg);
    init_logging(log_level, log_file);

    // Handle Config command separately (doesn't need a provider)
    if let Commands::Config = cli.command {
        handle_config_command(&cli, &cfg);
        return;
    }

    if let Err(e) = execute_command(cli, cfg).await {
        eprintln!("Error: {:#}", e);
        tracing::error!("Command failed: {:#}", e);
        std::process::exit(1);
    }
}
