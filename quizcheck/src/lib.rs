// ABOUTME: provides quizcheck helpers for parsing and checking a written quiz document.
// ABOUTME: reports verdicts as structured json so scheduled jobs can gate on them.

use anyhow::Context;
use tokio::io::AsyncReadExt;

use quiz_common::{
    check_document, parse_quiz_document, summarize, CheckError, DocumentSummary, ErrorCode, QuizDocument,
    DEFAULT_OUTPUT_PATH,
};

/// Reads a quiz document from inline json, stdin, or a file, in that order of precedence.
/// Without a file the default output path is read.
pub async fn read_document(file: Option<&str>, json: Option<&str>, stdin: bool) -> anyhow::Result<String> {
    if let Some(json) = json {
        return Ok(json.to_string());
    }

    if stdin {
        let mut input = String::new();
        tokio::io::stdin().read_to_string(&mut input).await?;
        return Ok(input);
    }

    let path = file.unwrap_or(DEFAULT_OUTPUT_PATH);
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read quiz document at {path}"))
}

pub fn parse_and_check(input: &str) -> anyhow::Result<QuizDocument> {
    let doc = parse_quiz_document(input)?;
    check_document(&doc).map_err(|e| anyhow::anyhow!(e.message))?;
    Ok(doc)
}

/// Outcome of checking one document. The week and question count are only
/// reported for a document that passes every check.
#[derive(Debug, serde::Serialize, PartialEq, Eq)]
pub struct ValidateVerdict {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_questions: Option<usize>,
    pub error: Option<CheckError>,
}

impl ValidateVerdict {
    fn passed(doc: &QuizDocument) -> Self {
        Self {
            ok: true,
            week_number: Some(doc.week_number),
            total_questions: Some(doc.questions.len()),
            error: None,
        }
    }

    fn failed(code: ErrorCode, message: String) -> Self {
        Self {
            ok: false,
            week_number: None,
            total_questions: None,
            error: Some(CheckError { code, message }),
        }
    }
}

pub fn validate_verdict(input: &str) -> ValidateVerdict {
    let doc = match parse_quiz_document(input) {
        Ok(doc) => doc,
        Err(err) => return ValidateVerdict::failed(ErrorCode::ParseFailed, err.to_string()),
    };

    match check_document(&doc) {
        Ok(()) => ValidateVerdict::passed(&doc),
        Err(err) => ValidateVerdict::failed(ErrorCode::ValidationFailed, err.message),
    }
}

pub fn summary_for(input: &str) -> anyhow::Result<DocumentSummary> {
    let doc = parse_and_check(input)?;
    Ok(summarize(&doc))
}

pub fn render_summary(summary: &DocumentSummary) -> String {
    let mut out = format!(
        "Week {} (updated {})\n  Total: {} questions\n  Easy: {}\n  Medium: {}\n  Hard: {}\n",
        summary.week_number,
        summary.last_updated,
        summary.total_questions,
        summary.difficulty.easy,
        summary.difficulty.medium,
        summary.difficulty.hard,
    );
    if summary.difficulty.other > 0 {
        out.push_str(&format!("  Other: {}\n", summary.difficulty.other));
    }
    out.push_str("Categories:\n");
    for (category, count) in &summary.categories {
        out.push_str(&format!("  {category}: {count}\n"));
    }
    out
}
