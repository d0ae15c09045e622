mod analyze;
mod collect;
mod db;
mod stats;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::collect::CollectArgs;
use crate::db::DbCommands;

#[derive(Debug, Parser)]
#[command(name = "yuqing-cli")]
#[command(about = "Keyword monitoring and sentiment pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Collect a monitoring task from its platforms
    Collect(CollectArgs),
    /// Score and extract keywords from a text
    Analyze {
        text: String,
        /// Language code (`zh`, `en`, ...)
        #[arg(long, default_value = "zh")]
        language: String,
        /// Number of keywords to show
        #[arg(long, default_value = "10")]
        top_k: usize,
    },
    /// Refresh and show daily sentiment statistics for a task
    Stats {
        /// Monitoring task id
        #[arg(long)]
        task: i64,
        /// Number of most recent days to show
        #[arg(long, default_value = "14")]
        days: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Read directly: `analyze` runs without the rest of the config.
    let configured = std::env::var("YUQING_LOG_LEVEL").ok();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_log_level(configured)))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => {
            let config = yuqing_core::load_app_config()?;
            db::run(&config, command).await?;
        }
        Some(Commands::Collect(args)) => {
            let config = yuqing_core::load_app_config()?;
            collect::run_collect(&config, args).await?;
        }
        Some(Commands::Analyze {
            text,
            language,
            top_k,
        }) => analyze::run_analyze(&text, &language, top_k)?,
        Some(Commands::Stats { task, days }) => {
            let config = yuqing_core::load_app_config()?;
            let pool = db::connect(&config).await?;
            stats::run_stats(&pool, task, days).await?;
        }
        None => println!("yuqing-cli: pass --help for available commands"),
    }

    Ok(())
}

/// `YUQING_LOG_LEVEL` when set and non-blank, `info` otherwise.
fn fallback_log_level(configured: Option<String>) -> String {
    configured
        .filter(|level| !level.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}
