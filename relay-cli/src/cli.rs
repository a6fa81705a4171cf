//! CLI parser and report formatting.

use clap::{Parser, Subcommand};
use storage::{BotStats, JobRecord};

#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(about = "Course relay bot: run, stats, jobs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the Telegram bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Print user and job totals from DATABASE_URL.
    Stats,
    /// List the most recent jobs of one user, newest first.
    Jobs {
        #[arg(short, long)]
        user: i64,
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },
}

pub fn format_stats(stats: &BotStats) -> String {
    format!(
        "users       {}\nsubscribed  {}\njobs        {}\ncompleted   {}\nvideos      {}\npdfs        {}",
        stats.users, stats.subscribed, stats.jobs, stats.done, stats.videos, stats.pdfs
    )
}

/// One line per job: id, status, start time, tally, course, channel and the error if any.
pub fn format_jobs(jobs: &[JobRecord]) -> String {
    if jobs.is_empty() {
        return "no jobs".to_string();
    }
    jobs.iter()
        .map(|job| {
            let tally = job.tally();
            let mut line = format!(
                "#{:<5} {:<8} {}  {}v/{}p  {} -> {}",
                job.id,
                job.status().as_str(),
                job.started_at.format("%Y-%m-%d %H:%M"),
                tally.videos,
                tally.pdfs,
                job.course,
                job.channel_id
            );
            if let Some(error) = &job.error_msg {
                line.push_str(&format!("  ({})", error));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
