// Grid Signal Engine - command line entry point

use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use grid_signal_engine::{
    logging, Config, EngineError, EngineResult, GridManager, KrakenTickerFeed, LoggingConfig,
    PaperExecutor, ReplayFeed, Trader,
};

#[derive(Parser)]
#[command(name = "grid-signal")]
#[command(version)]
#[command(about = "RSI/RSX grid signal engine", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Feed recorded prices through the engine and print one signal per sample
    Replay {
        /// File with one price per line (or CSV with price in the last column)
        file: String,

        /// Print full decision records as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Trade live prices from Kraken with paper execution
    Run {
        /// Stop after this many samples
        #[arg(short, long)]
        samples: Option<u64>,
    },

    /// Print the effective configuration (file plus GRID_* overrides)
    ShowConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging comes from the config file when it loads; fall back to defaults
    // so config errors are still visible
    let loaded = match &cli.command {
        Commands::Init { .. } => None,
        _ => Some(Config::from_file(&cli.config)),
    };
    let logging_config = match &loaded {
        Some(Ok(config)) => config.logging.clone(),
        _ => LoggingConfig::default(),
    };
    logging::init_logging(&logging_config, cli.verbose);

    let result = match cli.command {
        Commands::Init { force } => init_config(&cli.config, force),
        command => match loaded {
            Some(Ok(config)) => run_command(command, config).await,
            Some(Err(e)) => Err(EngineError::Config(e)),
            None => Ok(()),
        },
    };

    if let Err(e) = result {
        error!("❌ {} error: {}", e.category(), e);
        if matches!(e, EngineError::Config(_)) {
            error!("💡 Run: grid-signal init, then edit {}", cli.config);
        }
        std::process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config) -> EngineResult<()> {
    match command {
        Commands::Replay { file, json } => replay(&file, json, &config),
        Commands::Run { samples } => run_live(samples, config).await,
        Commands::ShowConfig => {
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| EngineError::Internal(e.to_string()))?;
            println!("{}", rendered);
            Ok(())
        }
        Commands::Init { .. } => Ok(()),
    }
}

fn init_config(path: &str, force: bool) -> EngineResult<()> {
    if Path::new(path).exists() && !force {
        warn!("⚠️  {} already exists, skipping (use --force to overwrite)", path);
        return Ok(());
    }

    Config::default().to_file(path)?;
    info!("📝 Created {}", path);
    Ok(())
}

fn replay(file: &str, json: bool, config: &Config) -> EngineResult<()> {
    let settings = config.strategy.to_settings()?;
    let mut manager = GridManager::new(settings)?;
    let feed = ReplayFeed::from_file(file)?;
    info!("▶️  Replaying {} prices from {}", feed.remaining(), file);

    for (n, price) in feed.enumerate() {
        let decision = manager.process_detailed(price)?;
        if json {
            println!("{}", serde_json::to_string(&decision).map_err(|e| EngineError::Internal(e.to_string()))?);
        } else {
            println!("{:>6}  {:>14.4}  {:>6.2}  {}", n + 1, price, decision.oscillator, decision.signal);
        }
    }

    let snapshot = manager.snapshot();
    info!(
        "🏁 Replay done: {} samples, last signal {} at line {} ({:.2})",
        snapshot.samples_processed, snapshot.last_signal, snapshot.last_signal_index, snapshot.signal_line
    );
    Ok(())
}

async fn run_live(samples: Option<u64>, config: Config) -> EngineResult<()> {
    if !config.execution.dry_run {
        return Err(EngineError::InvalidParameter(
            "execution.dry_run".to_string(),
            "only paper execution is available; set dry_run = true".to_string(),
        ));
    }

    let settings = config.strategy.to_settings()?;
    let manager = GridManager::new(settings)?;
    let feed = KrakenTickerFeed::connect(&config.feed.ws_url, &config.feed.trading_pair).await?;
    let executor = Arc::new(PaperExecutor::new());
    let interval = Duration::from_secs(config.feed.interval_seconds);

    info!(
        "🚀 Trading {} every {}s ({} -> {} swaps, paper mode)",
        config.feed.trading_pair, config.feed.interval_seconds, config.execution.base_currency, config.execution.quote_currency
    );

    let mut trader = Trader::new(feed, manager, executor, config.execution.clone(), interval);

    tokio::select! {
        result = trader.run(samples) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Received shutdown signal");
        }
    }

    let summary = trader.drain_monitors().await;
    info!("📊 Session summary:");
    info!("   Samples: {}", summary.samples);
    info!("   Buys: {} | Sells: {}", summary.buys, summary.sells);
    info!("   Feed errors: {} | Swap errors: {}", summary.feed_errors, summary.swap_errors);
    info!("   Finalized: {} | Unconfirmed: {}", summary.finalized, summary.unconfirmed);
    Ok(())
}
