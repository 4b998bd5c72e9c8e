// ABOUTME: reads the previous week number and overwrites the quiz document for the consuming app.
// ABOUTME: writes pretty json with non-ascii text preserved; no atomic rename or fsync is attempted.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use quiz_common::{QuizDocument, ValidatedQuizItem};
use serde_json::Value;

/// Week number stored in the existing document, or 0 when it cannot be read.
pub async fn load_week_number(path: &Path) -> u64 {
    let Ok(text) = tokio::fs::read_to_string(path).await else {
        return 0;
    };
    let Ok(value) = serde_json::from_str::<Value>(&text) else {
        return 0;
    };
    value.get("weekNumber").and_then(week_from_json).unwrap_or(0)
}

fn week_from_json(value: &Value) -> Option<u64> {
    if let Some(week) = value.as_u64() {
        return Some(week);
    }
    let week = value.as_f64()?;
    (week >= 0.0 && week.fract() == 0.0 && week < u64::MAX as f64).then_some(week as u64)
}

pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

pub async fn save_questions(
    path: &Path,
    questions: Vec<ValidatedQuizItem>,
    now: DateTime<Utc>,
) -> anyhow::Result<QuizDocument> {
    let week_number = load_week_number(path)
        .await
        .checked_add(1)
        .ok_or_else(|| anyhow::anyhow!("weekNumber overflow in {}", path.display()))?;
    let doc = QuizDocument::new(format_timestamp(now), week_number, questions);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }

    let json = serde_json::to_vec_pretty(&doc)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("write quiz document at {}", path.display()))?;

    Ok(doc)
}
