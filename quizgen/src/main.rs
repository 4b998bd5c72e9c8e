// ABOUTME: runs the weekly quiz job: fetch casts, generate questions, validate, and save the document.
// ABOUTME: exits non-zero with a diagnostic when credentials are missing or any stage fails.

mod config;
mod fetcher;
mod generator;
mod persist;
mod pipeline;
#[cfg(test)]
mod testutil;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "quizgen")]
struct Args {
    #[arg(long, default_value = quiz_common::DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    #[arg(long, default_value_t = 191)]
    fid: u64,

    #[arg(long, default_value_t = 50)]
    limit: u32,

    #[arg(long, default_value = "Jesse Pollak")]
    author_name: String,

    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    #[arg(long, default_value = fetcher::DEFAULT_FEED_URL)]
    feed_url: String,

    #[arg(long, default_value = generator::DEFAULT_MODEL_BASE_URL)]
    model_base_url: String,

    #[arg(long, default_value = generator::DEFAULT_MODEL)]
    model: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    config::load_env_file(&args.env_file);
    let credentials = config::Credentials::from_env()?;

    let config = config::Config {
        output: args.output,
        fid: args.fid,
        limit: args.limit,
        author_name: args.author_name,
        feed_url: args.feed_url,
        model_base_url: args.model_base_url,
        model: args.model,
    };

    let summary = pipeline::run(&config, &credentials).await?;
    tracing::info!(
        week = summary.week_number,
        total = summary.total,
        easy = summary.difficulty.easy,
        medium = summary.difficulty.medium,
        hard = summary.difficulty.hard,
        "weekly quiz written to {}",
        summary.output.display()
    );
    Ok(())
}
