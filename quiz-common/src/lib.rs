// ABOUTME: defines the shared quiz document types used by quizgen and quizcheck.
// ABOUTME: provides the lenient item validator for model output and strict checks for written documents.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_OUTPUT_PATH: &str = "app/data/quiz-questions.json";
pub const OPTION_COUNT: usize = 4;
pub const SOURCE_URL: &str = "https://warpcast.com/jessepollak";
pub const SOURCE_CAST: &str = "Jesse Pollak on Farcaster";
pub const DEFAULT_EXPLANATION: &str = "Based on Jesse Pollak's recent posts about Base.";
pub const DEFAULT_DIFFICULTY: &str = "medium";
pub const DEFAULT_CATEGORY: &str = "general";

/// A single post as returned by the feed api. Only `text` and `timestamp` are read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cast {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: String,
}

impl Cast {
    /// The calendar date part of the timestamp, e.g. `2024-01-01`.
    pub fn date(&self) -> &str {
        match self.timestamp.char_indices().nth(10) {
            Some((end, _)) => &self.timestamp[..end],
            None => &self.timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedResponse {
    #[serde(default)]
    pub casts: Vec<Cast>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidatedQuizItem {
    pub id: u32,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: u8,
    pub source_url: String,
    pub source_cast: String,
    pub explanation: String,
    pub difficulty: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuizDocument {
    /// UTC timestamp of the run that wrote the document, with a trailing `Z`.
    pub last_updated: String,
    pub week_number: u64,
    pub total_questions: usize,
    pub questions: Vec<ValidatedQuizItem>,
}

impl QuizDocument {
    pub fn new(last_updated: String, week_number: u64, questions: Vec<ValidatedQuizItem>) -> Self {
        Self {
            last_updated,
            week_number,
            total_questions: questions.len(),
            questions,
        }
    }
}

pub fn parse_quiz_document(input: &str) -> Result<QuizDocument, serde_json::Error> {
    serde_json::from_str(input)
}

/// Keeps the well-formed items of a model response and renumbers them 1..=n.
///
/// An item survives when it is an object with a string `question`, an `options`
/// array of exactly four strings and an integer `correctIndex` in `0..=3`.
/// Anything else is dropped without touching the rest of the batch. Optional
/// fields that are absent or not strings fall back to fixed defaults.
pub fn validate_items(raw: &[Value]) -> Vec<ValidatedQuizItem> {
    let mut validated = Vec::with_capacity(raw.len());
    for value in raw {
        let id = validated.len() as u32 + 1;
        if let Some(item) = validate_item(value, id) {
            validated.push(item);
        }
    }
    validated
}

fn validate_item(value: &Value, id: u32) -> Option<ValidatedQuizItem> {
    let obj = value.as_object()?;

    let question = obj.get("question")?.as_str()?;

    let options = obj.get("options")?.as_array()?;
    if options.len() != OPTION_COUNT {
        return None;
    }
    let options = options
        .iter()
        .map(|o| o.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()?;

    let correct_index = obj.get("correctIndex")?.as_u64()?;
    if correct_index >= OPTION_COUNT as u64 {
        return None;
    }

    let optional = |key: &str, default: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    };

    Some(ValidatedQuizItem {
        id,
        question: question.to_string(),
        options,
        correct_index: correct_index as u8,
        source_url: SOURCE_URL.to_string(),
        source_cast: SOURCE_CAST.to_string(),
        explanation: optional("explanation", DEFAULT_EXPLANATION),
        difficulty: optional("difficulty", DEFAULT_DIFFICULTY),
        category: optional("category", DEFAULT_CATEGORY),
    })
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ParseFailed,
    ValidationFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CheckError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Strict consistency checks over a document that was already written.
pub fn check_document(doc: &QuizDocument) -> Result<(), ValidationError> {
    if doc.week_number == 0 {
        return Err(ValidationError::new("weekNumber must be at least 1"));
    }

    if doc.total_questions != doc.questions.len() {
        return Err(ValidationError::new(format!(
            "totalQuestions is {} but the document holds {} questions",
            doc.total_questions,
            doc.questions.len()
        )));
    }

    for (position, item) in doc.questions.iter().enumerate() {
        let expected = position as u32 + 1;
        if item.id != expected {
            return Err(ValidationError::new(format!(
                "question ids must run 1..n; found id {} at position {expected}",
                item.id
            )));
        }
        if item.options.len() != OPTION_COUNT {
            return Err(ValidationError::new(format!(
                "question {expected} has {} options, expected {OPTION_COUNT}",
                item.options.len()
            )));
        }
        if usize::from(item.correct_index) >= OPTION_COUNT {
            return Err(ValidationError::new(format!(
                "question {expected} has correctIndex {} out of range",
                item.correct_index
            )));
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DifficultyBreakdown {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
    pub other: usize,
}

impl DifficultyBreakdown {
    pub fn from_items(items: &[ValidatedQuizItem]) -> Self {
        let mut breakdown = Self::default();
        for item in items {
            match item.difficulty.as_str() {
                "easy" => breakdown.easy += 1,
                "medium" => breakdown.medium += 1,
                "hard" => breakdown.hard += 1,
                _ => breakdown.other += 1,
            }
        }
        breakdown
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentSummary {
    pub week_number: u64,
    pub last_updated: String,
    pub total_questions: usize,
    pub difficulty: DifficultyBreakdown,
    pub categories: BTreeMap<String, usize>,
}

pub fn summarize(doc: &QuizDocument) -> DocumentSummary {
    let mut categories = BTreeMap::new();
    for item in &doc.questions {
        *categories.entry(item.category.clone()).or_insert(0) += 1;
    }

    DocumentSummary {
        week_number: doc.week_number,
        last_updated: doc.last_updated.clone(),
        total_questions: doc.questions.len(),
        difficulty: DifficultyBreakdown::from_items(&doc.questions),
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn well_formed(question: &str) -> Value {
        json!({
            "question": question,
            "options": ["a", "b", "c", "d"],
            "correctIndex": 2,
            "explanation": "because",
            "difficulty": "hard",
            "category": "technology"
        })
    }

    #[test]
    fn cast_date_takes_first_ten_chars() {
        let cast = Cast {
            text: "hi".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
        };
        assert_eq!(cast.date(), "2024-01-01");

        let short = Cast {
            text: "hi".to_string(),
            timestamp: "2024".to_string(),
        };
        assert_eq!(short.date(), "2024");
    }

    #[test]
    fn feed_response_tolerates_missing_fields() {
        let feed: FeedResponse =
            serde_json::from_str(r#"{"casts":[{"hash":"0x1"},{"text":"gm","timestamp":"2024-02-02T10:00:00Z"}],"next":{}}"#)
                .unwrap();
        assert_eq!(feed.casts.len(), 2);
        assert_eq!(feed.casts[0].text, "");
        assert_eq!(feed.casts[1].date(), "2024-02-02");

        let empty: FeedResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.casts.is_empty());
    }

    #[test]
    fn validate_keeps_well_formed_item() {
        let out = validate_items(&[well_formed("What is Base?")]);
        assert_eq!(out.len(), 1);
        let item = &out[0];
        assert_eq!(item.id, 1);
        assert_eq!(item.question, "What is Base?");
        assert_eq!(item.correct_index, 2);
        assert_eq!(item.difficulty, "hard");
        assert_eq!(item.category, "technology");
        assert_eq!(item.source_url, SOURCE_URL);
        assert_eq!(item.source_cast, SOURCE_CAST);
    }

    #[test]
    fn validate_fills_defaults_for_missing_optional_fields() {
        let raw = json!({
            "question": "q?",
            "options": ["a", "b", "c", "d"],
            "correctIndex": 0,
            "difficulty": null
        });
        let out = validate_items(&[raw]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].explanation, DEFAULT_EXPLANATION);
        assert_eq!(out[0].difficulty, DEFAULT_DIFFICULTY);
        assert_eq!(out[0].category, DEFAULT_CATEGORY);
    }

    #[test]
    fn validate_drops_malformed_items() {
        let raw = vec![
            json!({"question": "no index", "options": ["a", "b", "c", "d"]}),
            json!({"question": "three", "options": ["a", "b", "c"], "correctIndex": 0}),
            json!({"question": "five", "options": ["a", "b", "c", "d", "e"], "correctIndex": 0}),
            json!({"question": "high", "options": ["a", "b", "c", "d"], "correctIndex": 4}),
            json!({"question": "negative", "options": ["a", "b", "c", "d"], "correctIndex": -1}),
            json!({"question": "float", "options": ["a", "b", "c", "d"], "correctIndex": 1.5}),
            json!({"question": "numbers", "options": [1, 2, 3, 4], "correctIndex": 0}),
            json!({"options": ["a", "b", "c", "d"], "correctIndex": 0}),
            json!({"question": 7, "options": ["a", "b", "c", "d"], "correctIndex": 0}),
            json!("just a string"),
            json!(null),
        ];
        let out = validate_items(&raw);
        assert!(out.is_empty());
    }

    #[test]
    fn validate_renumbers_survivors_contiguously() {
        let raw = vec![
            json!({"question": "bad"}),
            well_formed("first"),
            json!({"question": "bad", "options": [], "correctIndex": 0}),
            json!({"question": "bad", "options": ["a", "b", "c", "d"], "correctIndex": 9}),
            well_formed("second"),
            well_formed("third"),
        ];
        let out = validate_items(&raw);
        assert!(out.len() <= raw.len());
        let ids: Vec<u32> = out.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        let questions: Vec<&str> = out.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(questions, vec!["first", "second", "third"]);
    }

    #[test]
    fn validate_never_emits_out_of_range_items() {
        let mut raw = Vec::new();
        for index in -2i64..7 {
            for count in 0..7usize {
                let options: Vec<String> = (0..count).map(|i| format!("opt{i}")).collect();
                raw.push(json!({"question": "q", "options": options, "correctIndex": index}));
            }
        }
        let out = validate_items(&raw);
        assert_eq!(out.len(), 4);
        for item in &out {
            assert_eq!(item.options.len(), OPTION_COUNT);
            assert!(usize::from(item.correct_index) < OPTION_COUNT);
        }
    }

    #[test]
    fn document_serializes_with_camel_case_keys_in_order() {
        let doc = QuizDocument::new(
            "2024-01-01T00:00:00.000000Z".to_string(),
            3,
            validate_items(&[well_formed("Is Base an L2?")]),
        );
        let text = serde_json::to_string(&doc).unwrap();
        assert!(text.starts_with(r#"{"lastUpdated":"2024-01-01T00:00:00.000000Z","weekNumber":3,"totalQuestions":1,"questions":[{"id":1,"question""#));
        assert!(text.contains(r#""correctIndex":2,"sourceUrl":"https://warpcast.com/jessepollak","sourceCast""#));
    }

    #[test]
    fn parse_rejects_unknown_fields_in_question() {
        let input = r#"{
          "lastUpdated": "2024-01-01T00:00:00Z",
          "weekNumber": 1,
          "totalQuestions": 1,
          "questions": [{
            "id": 1,
            "question": "q?",
            "options": ["a", "b", "c", "d"],
            "correctIndex": 0,
            "sourceUrl": "u",
            "sourceCast": "c",
            "explanation": "e",
            "difficulty": "easy",
            "category": "community",
            "unexpected": "hallucination"
          }]
        }"#;
        assert!(parse_quiz_document(input).is_err());
    }

    #[test]
    fn check_document_accepts_written_shape() {
        let doc = QuizDocument::new(
            "2024-01-01T00:00:00Z".to_string(),
            8,
            validate_items(&[well_formed("a"), well_formed("b")]),
        );
        check_document(&doc).unwrap();
    }

    #[test]
    fn check_document_rejects_count_mismatch() {
        let mut doc = QuizDocument::new(
            "2024-01-01T00:00:00Z".to_string(),
            1,
            validate_items(&[well_formed("a")]),
        );
        doc.total_questions = 2;
        let err = check_document(&doc).unwrap_err();
        assert!(err.message.contains("totalQuestions"));
    }

    #[test]
    fn check_document_rejects_id_gaps() {
        let mut doc = QuizDocument::new(
            "2024-01-01T00:00:00Z".to_string(),
            1,
            validate_items(&[well_formed("a"), well_formed("b")]),
        );
        doc.questions[1].id = 3;
        let err = check_document(&doc).unwrap_err();
        assert!(err.message.contains("found id 3 at position 2"));
    }

    #[test]
    fn check_document_accepts_empty_question_text() {
        let raw = json!({"question": "", "options": ["a", "b", "c", "d"], "correctIndex": 0});
        let doc = QuizDocument::new("2024-01-01T00:00:00Z".to_string(), 1, validate_items(&[raw]));
        assert_eq!(doc.total_questions, 1);
        check_document(&doc).unwrap();
    }

    #[test]
    fn check_document_rejects_week_zero() {
        let doc = QuizDocument::new("2024-01-01T00:00:00Z".to_string(), 0, vec![]);
        assert!(check_document(&doc).is_err());
    }

    #[test]
    fn summarize_counts_difficulties_and_categories() {
        let raw = vec![
            well_formed("a"),
            json!({"question": "b", "options": ["a", "b", "c", "d"], "correctIndex": 1, "difficulty": "easy", "category": "ecosystem"}),
            json!({"question": "c", "options": ["a", "b", "c", "d"], "correctIndex": 1}),
            json!({"question": "d", "options": ["a", "b", "c", "d"], "correctIndex": 1, "difficulty": "expert"}),
        ];
        let doc = QuizDocument::new("2024-01-01T00:00:00Z".to_string(), 2, validate_items(&raw));
        let summary = summarize(&doc);
        assert_eq!(summary.total_questions, 4);
        assert_eq!(
            summary.difficulty,
            DifficultyBreakdown {
                easy: 1,
                medium: 1,
                hard: 1,
                other: 1
            }
        );
        assert_eq!(summary.categories.get("general"), Some(&2));
        assert_eq!(summary.categories.get("technology"), Some(&1));
        assert_eq!(summary.categories.get("ecosystem"), Some(&1));
    }
}
