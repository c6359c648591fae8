use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rocket_miner::db::Database;
use rocket_miner::miner::RocketMiner;
use rocket_miner::seed;

#[derive(Parser)]
#[command(name = "rminer")]
#[command(about = "Ranking queries over a launch history database")]
struct Cli {
    /// Database file (defaults to $ROCKET_MINER_DB, then the user data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import launches from a JSON seed file
    Import { path: PathBuf },
    /// Rockets with the most launches
    MostLaunched {
        #[arg(short, long, default_value = "10", allow_negative_numbers = true)]
        k: i64,
    },
    /// Service providers with the best success ratio
    MostReliable {
        #[arg(short, long, default_value = "10", allow_negative_numbers = true)]
        k: i64,
    },
    /// Newest launches
    MostRecent {
        #[arg(short, long, default_value = "10", allow_negative_numbers = true)]
        k: i64,
    },
    /// Priciest launches
    MostExpensive {
        #[arg(short, long, default_value = "10", allow_negative_numbers = true)]
        k: i64,
    },
    /// Share of successful launches in a year
    SuccessRate {
        #[arg(short, long)]
        year: i32,
    },
    /// Country with the most launches into an orbit
    DominantCountry {
        #[arg(short, long)]
        orbit: String,
    },
    /// Manufacturers with the highest launch revenue in a year
    TopRevenue {
        #[arg(short, long, default_value = "10", allow_negative_numbers = true)]
        k: i64,
        #[arg(short, long)]
        year: i32,
    },
    /// Rocket from a country whose launch carried the most active payloads
    MostActivePayloads {
        #[arg(short, long)]
        country: String,
    },
}

/// Logs go to stderr so stdout only carries query results.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "rocket_miner=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let db = match cli.db {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;

    let miner = RocketMiner::new(&db);

    match cli.command {
        Commands::Import { path } => {
            let seed = seed::load(&path)?;
            let summary = seed::import(&db, &seed).context("Import failed")?;
            print_json(&summary)?;
        }
        Commands::MostLaunched { k } => print_json(&miner.most_launched_rockets(k)?)?,
        Commands::MostReliable { k } => {
            print_json(&miner.most_reliable_launch_service_providers(k)?)?
        }
        Commands::MostRecent { k } => print_json(&miner.most_recent_launches(k)?)?,
        Commands::MostExpensive { k } => print_json(&miner.most_expensive_launches(k)?)?,
        Commands::SuccessRate { year } => {
            print_json(&miner.successful_launch_rate_in_year(year)?)?
        }
        Commands::DominantCountry { orbit } => print_json(&miner.dominant_country(&orbit)?)?,
        Commands::TopRevenue { k, year } => {
            print_json(&miner.highest_revenue_launch_service_providers(k, year)?)?
        }
        Commands::MostActivePayloads { country } => {
            print_json(&miner.rocket_with_most_active_payloads(&country)?)?
        }
    }

    Ok(())
}
