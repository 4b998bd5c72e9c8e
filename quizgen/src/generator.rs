// ABOUTME: asks the generative model for quiz items grounded in the fetched casts.
// ABOUTME: turns blocked, empty, or unparseable completions into typed errors instead of panics.

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_MODEL_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";
pub const QUESTION_TARGET: usize = 50;

const SHORT_COMPLETION_CHARS: usize = 100;
const PREVIEW_CHARS: usize = 500;

#[derive(Debug)]
pub enum GenerateError {
    /// The model returned no usable candidate because of its content filters.
    Blocked { feedback: Option<String> },
    Empty,
    InvalidJson(serde_json::Error),
    NotAnArray,
    Status { status: StatusCode, body: String },
    Transport(reqwest::Error),
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Blocked { feedback: Some(feedback) } => {
                write!(f, "model blocked the response (safety filters): {feedback}")
            }
            GenerateError::Blocked { feedback: None } => write!(f, "model blocked the response (safety filters)"),
            GenerateError::Empty => write!(f, "model returned an empty response"),
            GenerateError::InvalidJson(err) => write!(f, "model returned invalid json: {err}"),
            GenerateError::NotAnArray => write!(f, "model returned json that is not an array"),
            GenerateError::Status { status, body } => write!(f, "model api returned {status}: {body}"),
            GenerateError::Transport(err) => write!(f, "model api request failed: {err}"),
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::InvalidJson(err) => Some(err),
            GenerateError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GenerateError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

pub fn build_prompt(author_name: &str, context: &str) -> String {
    format!(
        r#"Based on these recent posts from {author_name} (founder of Base blockchain):

{context}

Generate exactly {QUESTION_TARGET} multiple-choice quiz questions about Base, Farcaster, and recent developments.

REQUIREMENTS:
1. Each question must have exactly 4 options
2. Return in this EXACT JSON format:
[
  {{
    "question": "Question text?",
    "options": ["Option A", "Option B", "Option C", "Option D"],
    "correctIndex": 0,
    "explanation": "Why this answer is correct",
    "difficulty": "easy",
    "category": "product-update"
  }}
]

3. Mix difficulty: 15 easy, 25 medium, 10 hard
4. Categories: product-update, ecosystem, technology, community
5. Make questions specific to the posts above

Return ONLY the JSON array, no markdown formatting."#
    )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, all parts joined.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

pub fn interpret_response(response: &GenerateResponse) -> Result<Vec<Value>, GenerateError> {
    let Some(candidate) = response.candidates.first() else {
        let feedback = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone());
        return Err(GenerateError::Blocked { feedback });
    };

    let text = response.text();
    if text.trim().is_empty() {
        return match candidate.finish_reason.as_deref() {
            Some(reason) if reason != "STOP" => Err(GenerateError::Blocked {
                feedback: Some(format!("finish reason {reason}")),
            }),
            _ => Err(GenerateError::Empty),
        };
    }

    parse_completion(&text)
}

/// Strips markdown code fences from a completion and parses the json array inside.
pub fn parse_completion(text: &str) -> Result<Vec<Value>, GenerateError> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Err(GenerateError::Empty);
    }
    if cleaned.chars().count() < SHORT_COMPLETION_CHARS {
        tracing::warn!("short completion: {cleaned}");
    }

    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(GenerateError::NotAnArray),
        Err(err) => {
            let preview: String = text.chars().take(PREVIEW_CHARS).collect();
            tracing::error!("first {PREVIEW_CHARS} chars of completion: {preview}");
            Err(GenerateError::InvalidJson(err))
        }
    }
}

pub struct ModelClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl ModelClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    pub async fn generate(&self, prompt: &str) -> Result<Vec<Value>, GenerateError> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest::new(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Status { status, body });
        }

        let response: GenerateResponse = response.json().await?;
        let items = interpret_response(&response)?;
        tracing::info!(count = items.len(), "model generated questions");
        Ok(items)
    }
}
