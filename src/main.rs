use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use league_signals::analysis::record::RecordBuilder;
use league_signals::api::client::RiotApiClient;
use league_signals::cache::PlayerRegistry;
use league_signals::config::Config;
use league_signals::display::output::{
    display_error, display_info, display_record, display_success, display_summary,
};
use league_signals::model::Identity;
use league_signals::rate_limit::Pacer;
use league_signals::run::BatchRunner;
use league_signals::storage::{open_record_sink, read_game_list, RecordSink};

#[derive(Parser, Debug)]
#[command(name = "League Signals")]
#[command(about = "Derive smurf/inter/streak signals for every player in a match", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Region (default: na1)
    #[arg(short, long, global = true)]
    region: Option<String>,

    /// Number of recent Summoner's Rift games per player (default: 5)
    #[arg(short, long, global = true, default_value = "5")]
    window: usize,

    /// Parallel player lookups per match (default: 4)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// File records are appended to (.csv, or JSONL for any other extension)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one match from one player's point of view
    Analyze {
        /// Match id, e.g. NA1_3931766940
        match_id: String,

        /// Summoner name of the requesting player
        player: String,
    },

    /// Analyze every game in a `gameid,player` CSV (or a JSONL file of {"match_id", "player"} lines)
    Run {
        games: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(cli) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    ensure!(cli.window > 0, "--window must be at least 1");

    let mut config = Config::from_env()?;
    if let Some(region) = cli.region {
        config.region = region;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }

    let output = cli.output.unwrap_or_else(Config::default_output_path);
    let sink = open_record_sink(output.clone());

    let pacer = Arc::new(Pacer::new(config.request_interval)?);
    let client = Arc::new(RiotApiClient::new(config.clone(), Arc::clone(&pacer)));
    let registry = Arc::new(PlayerRegistry::new(client));
    let builder = RecordBuilder::new(registry, config.workers);

    display_info(&format!(
        "Region {}, {} games per player, {} workers",
        config.region, cli.window, config.workers
    ));

    match cli.command {
        Commands::Analyze { match_id, player } => {
            let identity = Identity::new(&player);
            display_info(&format!("Analyzing {} for {}...", match_id, identity));

            let record = builder
                .build(&match_id, &identity, cli.window)
                .with_context(|| format!("analyzing {} for {}", match_id, identity))?;
            sink.append(&record)
                .with_context(|| format!("writing {}", output.display()))?;

            display_record(&record);
            display_success(&format!("Record appended to {}", output.display()));
        }
        Commands::Run { games } => {
            let games = read_game_list(&games)
                .with_context(|| format!("reading {}", games.display()))?;
            display_info(&format!("Loaded {} games", games.len()));

            let runner = BatchRunner::new(builder, sink, cli.window);
            let pb = ProgressBar::new(games.len() as u64);
            pb.set_message("Analyzing games");
            let summary = runner.run_with_progress(&games, |_| pb.inc(1))?;
            pb.finish_with_message("✓ Run complete");

            display_summary(&summary);
        }
    }

    pacer.display_status();
    Ok(())
}
