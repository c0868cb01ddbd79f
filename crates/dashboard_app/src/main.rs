mod platform;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use dashboard_logging::{dash_info, LogDestination};
use log::LevelFilter;
use platform::{DashboardConfig, DEFAULT_CONFIG_FILE};

#[derive(Debug, Parser)]
#[command(name = "dashboard", version, about = "Conversation history and plugin marketplace dashboard")]
struct Args {
    /// RON configuration file; defaults are used when it does not exist.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Base URL of the dashboard API.
    #[arg(long)]
    base_url: Option<String>,

    /// Directory the rendered pages are written to.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Log destination: file, terminal or both.
    #[arg(long)]
    log: Option<LogDestination>,

    /// Stop after this many seconds instead of waiting for `quit`.
    #[arg(long)]
    run_for_secs: Option<u64>,

    /// Print the default configuration as RON and exit.
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        println!("{}", DashboardConfig::default().to_ron()?);
        return Ok(());
    }

    let loaded = DashboardConfig::load(&args.config)?;
    let from_file = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(destination) = args.log {
        config.log_destination = destination;
    }
    config.validate()?;

    dashboard_logging::initialize(config.log_destination, LevelFilter::Info, &config.log_file);
    if from_file {
        dash_info!("Loaded configuration from {}", args.config.display());
    } else {
        dash_info!(
            "No configuration at {}; using defaults",
            args.config.display()
        );
    }

    platform::run_app(config, args.run_for_secs.map(Duration::from_secs))
}
