mod config;
mod models;
mod pipeline;
mod scraper;
mod seeds;
mod storage;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::AppConfig;
use crate::pipeline::Pipeline;
use crate::storage::{Repository, Table};

#[derive(Parser)]
#[command(name = "tm-crawler", about = "Transfermarkt league/team/player crawler", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl every configured season: leagues, their teams, their players
    Run {
        /// Season starting year; repeat to crawl several (default: from config)
        #[arg(short, long = "season", value_parser = clap::value_parser!(i32).range(1900..=2999))]
        seasons: Vec<i32>,
    },

    /// Show database statistics
    Stats,

    /// Apply schema migrations without crawling
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "tm_crawler=info,warn",
        1 => "tm_crawler=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Run { seasons } => {
            if !seasons.is_empty() {
                config.crawl.seasons = seasons;
            }
            let _t = utils::StageTimer::start(
                utils::Stage::Crawl,
                format!("of {} seasons", config.crawl.seasons.len()),
            );
            let stats = Pipeline::new(config).run().await?;
            info!(
                "Done: {} leagues, {} teams, {} players saved",
                stats.leagues_saved, stats.teams_saved, stats.players_saved
            );
        }

        Command::Stats => {
            let repo = Repository::open(&config.storage.db_path)?;
            repo.run_migrations()?;
            let last = repo.last_scrape_run()?;
            println!("─────────────────────────────────");
            println!("  Transfermarkt crawler — Database Stats");
            println!("─────────────────────────────────");
            for table in [Table::Leagues, Table::Teams, Table::Players] {
                println!("  {:<8} : {}", table.as_str(), repo.count(table)?);
            }
            match last {
                Some(run) => {
                    println!("  Last run : #{} {} ({})", run.id, run.started_at, run.status);
                    if let Some(finished) = run.finished_at {
                        println!("  Finished : {}", finished);
                    }
                    println!(
                        "  Saved    : {} leagues, {} teams, {} players",
                        run.leagues, run.teams, run.players
                    );
                    if let Some(msg) = run.error_msg {
                        println!("  Error    : {}", msg);
                    }
                }
                None => println!("  Last run : —"),
            }
            println!("─────────────────────────────────");
        }

        Command::Migrate => {
            Repository::open(&config.storage.db_path)?.run_migrations()?;
            println!("Migrations applied.");
        }
    }

    Ok(())
}
