//! relay CLI: run the bot, or print stats and job history from the database.

use anyhow::{Context, Result};
use clap::Parser;
use relay_cli::{format_jobs, format_stats, Cli, Commands};
use relay_telegram::{run_bot, AppConfig};
use storage::{JobRepository, SqlitePoolManager};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = AppConfig::load(token)?;
            run_bot(config).await
        }
        Commands::Stats => {
            let jobs = open_jobs().await?;
            println!("{}", format_stats(&jobs.stats().await?));
            Ok(())
        }
        Commands::Jobs { user, limit } => {
            let jobs = open_jobs().await?;
            println!("{}", format_jobs(&jobs.recent_for_user(user, limit).await?));
            Ok(())
        }
    }
}

/// Opens the job repository at DATABASE_URL. Logs go to the console for these commands.
async fn open_jobs() -> Result<JobRepository> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
        .with_target(false)
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://relay.db".to_string());
    let pool = SqlitePoolManager::new(&database_url)
        .await
        .with_context(|| format!("Failed to open {}", database_url))?;
    Ok(JobRepository::from_pool(pool))
}
