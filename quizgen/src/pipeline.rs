// ABOUTME: runs fetch, generate, validate and persist exactly once, in order, with no retries.
// ABOUTME: any stage failure aborts the run so the binary exits non-zero with a diagnostic.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use quiz_common::{validate_items, DifficultyBreakdown};

use crate::config::{Config, Credentials};
use crate::fetcher::FeedClient;
use crate::generator::{build_prompt, ModelClient, QUESTION_TARGET};
use crate::persist;

/// Below this many validated items the run still succeeds but warns.
pub const MIN_EXPECTED_QUESTIONS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub week_number: u64,
    pub total: usize,
    pub difficulty: DifficultyBreakdown,
}

pub async fn run(config: &Config, credentials: &Credentials) -> anyhow::Result<RunSummary> {
    let http = reqwest::Client::builder()
        .build()
        .context("build http client")?;
    run_with_client(http, config, credentials).await
}

pub async fn run_with_client(
    http: reqwest::Client,
    config: &Config,
    credentials: &Credentials,
) -> anyhow::Result<RunSummary> {
    tracing::info!(fid = config.fid, author = %config.author_name, "fetching casts");
    let feed = FeedClient::new(http.clone(), &config.feed_url, &credentials.neynar_api_key);
    let digest = feed
        .fetch_digest(&config.author_name, config.fid, config.limit)
        .await
        .context("failed to fetch casts")?;
    tracing::info!(count = digest.cast_count, "fetched casts from {}", config.author_name);

    if digest.text.is_empty() {
        anyhow::bail!("failed to fetch casts: feed returned no casts with text");
    }

    tracing::info!(model = %config.model, "generating questions");
    let model = ModelClient::new(
        http,
        &config.model_base_url,
        &config.model,
        &credentials.gemini_api_key,
    );
    let prompt = build_prompt(&config.author_name, &digest.text);
    let raw = model
        .generate(&prompt)
        .await
        .context("failed to generate questions")?;

    if raw.is_empty() {
        anyhow::bail!("failed to generate questions: model returned no items");
    }

    let validated = validate_items(&raw);
    tracing::info!(count = validated.len(), dropped = raw.len() - validated.len(), "validated questions");

    if validated.len() < MIN_EXPECTED_QUESTIONS {
        tracing::warn!(
            "only {} valid questions (expected {QUESTION_TARGET})",
            validated.len()
        );
    }

    let difficulty = DifficultyBreakdown::from_items(&validated);
    let doc = persist::save_questions(&config.output, validated, Utc::now()).await?;
    tracing::info!(
        week = doc.week_number,
        path = %config.output.display(),
        "saved {} questions",
        doc.total_questions
    );

    Ok(RunSummary {
        output: config.output.clone(),
        week_number: doc.week_number,
        total: doc.total_questions,
        difficulty,
    })
}
