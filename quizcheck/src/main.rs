// ABOUTME: provides a user-facing cli for checking the quiz document written by quizgen.
// ABOUTME: prints deterministic json verdicts or a human-readable summary.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quizcheck::{read_document, render_summary, summary_for, validate_verdict};

#[derive(Debug, Parser)]
#[command(name = "quizcheck")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Validate {
        #[arg(long)]
        file: Option<String>,

        #[arg(long)]
        json: Option<String>,

        #[arg(long)]
        stdin: bool,
    },
    Summary {
        #[arg(long)]
        file: Option<String>,

        #[arg(long)]
        as_json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Validate { file, json, stdin } => {
            let input = read_document(file.as_deref(), json.as_deref(), stdin).await?;
            let verdict = validate_verdict(&input);
            if let Some(err) = &verdict.error {
                tracing::warn!(code = ?err.code, "quiz document failed checks: {}", err.message);
            }
            print!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Command::Summary { file, as_json } => {
            let input = read_document(file.as_deref(), None, false).await?;
            let summary = summary_for(&input)?;
            if as_json {
                print!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", render_summary(&summary));
            }
        }
    }

    Ok(())
}
