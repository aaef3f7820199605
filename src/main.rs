//! Lucky - market valuation reports and server chores
//!
//! A personal CLI that fetches bond yields, the Shiller CAPE and exchange
//! rates concurrently, renders them as tables or pushes them to Telegram,
//! and wraps a few external tools (ssh, tccli, adb).
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (invalid arguments, failed source, failed push, etc.)

mod aggregate;
mod cli;
mod commands;
mod config;
mod errors;
mod models;
mod notify;
mod report;
mod sources;
mod system;

use anyhow::Result;
use chrono::Local;
use cli::{Args, Command, DestCommand};
use commands::{market, ops, Output};
use config::{Config, Destination};
use sources::LiveMarketData;
use std::path::{Path, PathBuf};
use system::SystemRunner;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if let Command::InitConfig = args.command {
        return handle_init_config(&args);
    }

    // Initialize logging
    init_logging(&args);

    info!("Lucky v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Command failed: {}", e);
            debug!("{:?}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle `init-config`: generate a default config file.
fn handle_init_config(args: &Args) -> Result<()> {
    let path = config_path(args)?;

    match ops::init_config(&path) {
        Ok(text) => {
            print!("{}", text);
            Ok(())
        }
        Err(e) => {
            eprintln!("⚠️  {}", e);
            std::process::exit(1);
        }
    }
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so report output on stdout stays machine-readable.
/// `RUST_LOG` overrides the level derived from `--verbose`/`--quiet`.
fn init_logging(args: &Args) {
    let level = args.log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn config_path(args: &Args) -> Result<PathBuf> {
    match args.config {
        Some(ref path) => Ok(path.clone()),
        None => Ok(Config::default_path()?),
    }
}

/// Load configuration from file or use defaults.
fn load_config(path: &Path) -> Result<Config> {
    match Config::load_if_exists(path)? {
        Some(config) => {
            info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => {
            debug!("No config file at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }
}

/// Dispatch the parsed subcommand.
async fn run(args: Args) -> Result<()> {
    let path = config_path(&args)?;
    let mut config = load_config(&path)?;
    config.merge_with_args(&args);
    config.validate()?;

    let output = Output::new(args.format, args.quiet);
    let runner = SystemRunner;

    let text = match args.command {
        Command::Pe { .. }
        | Command::Push
        | Command::Cape { .. }
        | Command::Forex(_)
        | Command::Daily(_) => {
            let market = LiveMarketData::from_config(&config)?;
            let today = Local::now().date_naive();
            market::run(&market, &config, &output, &args.command, today).await?
        }
        Command::Ssh { ref dest } => {
            ops::ssh(&runner, &config, dest).await?;
            String::new()
        }
        Command::Reboot { ref dest } => ops::reboot(&runner, &config, dest).await?,
        Command::Game(ref game) => {
            let shutdown = async {
                // An error here means no handler could be installed; run until the count.
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            };
            let taps = ops::game(
                &runner,
                &config.game,
                game.device.as_deref(),
                game.count,
                &ops::prompt_device,
                shutdown,
            )
            .await?;
            format!("✅ Sent {} taps\n", taps)
        }
        Command::Dest(DestCommand::List) => ops::dest_list(&config, &output)?,
        Command::Dest(DestCommand::Add {
            ref name,
            ref ssh,
            ref region,
            ref instance_id,
        }) => {
            let dest = Destination {
                ssh: ssh.trim().to_string(),
                region: region.trim().to_string(),
                instance_id: instance_id.trim().to_string(),
            };
            ops::dest_add(&mut config, &path, name.trim(), dest)?
        }
        Command::InitConfig => ops::init_config(&path)?,
    };

    if !text.is_empty() {
        print!("{}", text);
    }

    Ok(())
}
