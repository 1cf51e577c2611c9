//! Dutching sniper entry point.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dutch_sniper::arbitrage::{evaluate_snapshot, Decision};
use dutch_sniper::config::{Config, RiskParameters};
use dutch_sniper::market::{MarketSnapshot, ReplayFeed};
use dutch_sniper::metrics;
use dutch_sniper::sniper::{Sniper, Termination};
use dutch_sniper::trading::{PaperGateway, Side};
use dutch_sniper::utils::ShutdownFlag;

/// Single-market dutching sniper.
#[derive(Parser, Debug)]
#[command(name = "dutch-sniper")]
#[command(
    about = "Watches one market and fires a single dutching batch when the book goes out of line"
)]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the market until a shot is taken or it closes (default).
    Run {
        /// Recorded snapshots to replay.
        #[arg(long, env = "REPLAY_FILE")]
        replay: Option<PathBuf>,

        /// Market to watch.
        #[arg(long)]
        market_id: Option<String>,

        /// Back or lay every runner.
        #[arg(long)]
        side: Option<Side>,

        /// Keep serving the final snapshot once the recording runs out.
        #[arg(long)]
        hold_last: bool,
    },

    /// Check configuration validity and show the sniping rules.
    CheckConfig,

    /// Evaluate one snapshot file and print the decision.
    Evaluate {
        /// JSON file holding a single snapshot.
        #[arg(long)]
        snapshot: PathBuf,

        /// Back or lay every runner.
        #[arg(long)]
        side: Option<Side>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration; each command decides how to report a failure
    let loaded = Config::load();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("dutch_sniper=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let json = loaded.as_ref().is_ok_and(Config::json_logs);
    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Initialize metrics
    metrics::init_metrics();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(loaded),
        Some(Command::Evaluate { snapshot, side }) => cmd_evaluate(loaded, snapshot, side).await,
        Some(Command::Run {
            replay,
            market_id,
            side,
            hold_last,
        }) => cmd_run(loaded, replay, market_id, side, hold_last).await,
        None => cmd_run(loaded, None, None, None, false).await,
    }
}

/// Check configuration validity.
fn cmd_check_config(loaded: Result<Config, envy::Error>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("DUTCHING SNIPER - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match loaded {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    let risk = config.risk_parameters();
    let threshold = dutch_sniper::arbitrage::trigger_threshold(risk.side, risk.trigger_margin);

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Sniping Rules:");
    println!("  Market: {}", config.market_id);
    println!("  Side: {}", risk.side);
    println!("  Minimum stake: {}", risk.minimum_stake);
    println!("  Maximum total stake: {}", risk.max_total_stake);
    println!("  Trigger margin: {}% (fires at {}%)", risk.trigger_margin, threshold);
    println!("  Exclude over: {}", risk.exclude_over);
    println!("  Minimum profit: {}", risk.minimum_profit);
    println!("  Refresh: {}s", config.refresh_seconds);
    println!("  Abort on suspend: {}", if risk.abort_on_suspend { "Yes" } else { "No" });
    println!("  Bet in play: {}", if risk.bet_in_play { "Yes" } else { "No" });
    println!("----------------------------------------------------------------------");
    println!("Runtime:");
    match &config.replay_file {
        Some(path) => println!("  Feed: replay ({})", path),
        None => println!("  Feed: none (set REPLAY_FILE or pass --replay)"),
    }
    println!("  Gateway: paper (training exercise, firing blanks)");
    match config.metrics_port {
        Some(port) => println!("  Metrics: http://0.0.0.0:{}/metrics", port),
        None => println!("  Metrics: Disabled"),
    }
    println!("  Log format: {}", if config.json_logs() { "JSON" } else { "Text" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Evaluate a single snapshot without submitting anything.
async fn cmd_evaluate(
    loaded: Result<Config, envy::Error>,
    path: PathBuf,
    side: Option<Side>,
) -> anyhow::Result<()> {
    let mut risk = match loaded {
        Ok(config) => config.risk_parameters(),
        Err(e) => {
            warn!("Configuration not loaded ({}), using default sniping rules", e);
            RiskParameters::default()
        }
    };
    if let Some(side) = side {
        risk.side = side;
    }

    let json = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot: MarketSnapshot = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse snapshot in {}", path.display()))?;

    println!("======================================================================");
    println!(
        "MARKET {} - {} ({} runners)",
        snapshot.market_id(),
        snapshot.status(),
        snapshot.runners().len()
    );
    println!("======================================================================");

    let evaluation = match evaluate_snapshot(&snapshot, &risk) {
        Ok(evaluation) => evaluation,
        Err(e) => {
            println!("Incomplete book: {}", e);
            return Ok(());
        }
    };

    println!("{}", evaluation);
    if !evaluation.excluded.is_empty() {
        let ignored: Vec<String> = evaluation.excluded.iter().map(|k| k.to_string()).collect();
        println!("Ignoring: {}", ignored.join(", "));
    }

    match &evaluation.decision {
        Decision::Idle => println!("No opportunity"),
        Decision::Rejected { reason } => println!("Opportunity rejected: {}", reason),
        Decision::Fire { plan } => {
            println!("----------------------------------------------------------------------");
            for leg in &plan.legs {
                println!(
                    "{} {:<28} for {:>11.2} @ {:>6.2} {:>11.2} avail.",
                    if plan.side == Side::Back { "Back" } else { "Lay " },
                    leg.runner.label(),
                    leg.stake,
                    leg.runner.price,
                    leg.runner.available,
                );
            }
            println!("----------------------------------------------------------------------");
            println!(
                "{:.2} required for avg profit of {:.2} (worst case {:.2}, {:.2}% of stake)",
                plan.total_stake,
                plan.average_profit,
                plan.min_profit,
                plan.worst_case_roi()
            );
            println!("{}", serde_json::to_string_pretty(plan)?);
        }
    }

    Ok(())
}

/// Run the polling loop against a replayed feed and the paper gateway.
async fn cmd_run(
    loaded: Result<Config, envy::Error>,
    replay: Option<PathBuf>,
    market_id: Option<String>,
    side: Option<Side>,
    hold_last: bool,
) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let mut config = loaded.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(market_id) = market_id {
        config.market_id = market_id;
    }
    if let Some(side) = side {
        config.bet_side = side;
    }
    if let Some(replay) = replay {
        config.replay_file = Some(replay.display().to_string());
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    if let Some(port) = config.metrics_port {
        metrics::install_exporter(port)
            .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;
    }

    let replay_file = config
        .replay_file
        .clone()
        .context("no market feed: set REPLAY_FILE or pass --replay")?;
    let feed = ReplayFeed::from_path(&replay_file).await?.hold_last(hold_last);

    info!("Configuration loaded successfully");
    info!("Market: {}", config.market_id);
    info!("Side: {}", config.bet_side);
    info!(
        "Minimum stake: {}, maximum total: {}",
        config.minimum_stake, config.max_total_stake
    );
    info!(
        "Trigger margin: {}%, exclude over: {}",
        config.trigger_margin, config.exclude_over
    );

    let sniper = Sniper::from_config(&config, feed, PaperGateway::new());
    let summary = sniper.run(ShutdownFlag::on_signal()).await?;

    info!("========================================");
    match &summary.termination {
        Termination::Done(report) => {
            info!("SHOT TAKEN");
            let mode = if report.live { "LIVE" } else { "SIMULATION" };
            info!("Gateway: {} ({})", report.gateway, mode);
            info!("Bets: {}, failed: {}", report.outcomes.len(), report.failures().count());
            info!("Total stake: {}", report.total_stake().round_dp(2));
        }
        Termination::Aborted(reason) => info!("ABORTED: {}", reason),
        Termination::Cancelled => info!("CANCELLED"),
    }
    info!("----------------------------------------");
    info!("Polls: {}", summary.state.polls);
    info!("Opportunities: {}", summary.state.opportunities);
    info!("Rejected plans: {}", summary.state.rejections);
    if let Some(overround) = summary.state.last_overround {
        info!("Last overround: {:.2}%", overround);
    }
    info!("========================================");

    Ok(())
}
