//! Core data model types for evalform.
//!
//! Evaluations and their questions arrive from a remote store; responses are
//! collected locally and turned into an [`AnswerRecord`] on submit.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest value a scale question accepts.
pub const SCALE_MIN: u8 = 1;
/// Highest value a scale question accepts.
pub const SCALE_MAX: u8 = 10;
/// Value shown by a scale control before the user moves it.
pub const SCALE_DEFAULT: u8 = 1;

/// A named set of questions to be answered by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: i64,
    pub title: String,
    /// Questions in display order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Evaluation {
    /// Look up a question by id.
    pub fn question(&self, id: i64) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// One prompt within an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub label: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// The input a question expects, carried in the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    /// Free text.
    Text,
    /// Integer between [`SCALE_MIN`] and [`SCALE_MAX`].
    Scale,
    /// One of a closed list of options.
    MultipleChoice {
        #[serde(default)]
        options: Vec<String>,
    },
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Text => write!(f, "text"),
            QuestionKind::Scale => write!(f, "scale"),
            QuestionKind::MultipleChoice { .. } => write!(f, "multiple-choice"),
        }
    }
}

/// Parse a raw scale value and clamp it into `[SCALE_MIN, SCALE_MAX]`.
///
/// Returns `None` when the value is not an integer.
pub fn clamp_scale(raw: &str) -> Option<u8> {
    let value: i64 = raw.trim().parse().ok()?;
    Some(value.clamp(SCALE_MIN as i64, SCALE_MAX as i64) as u8)
}

/// Raw responses entered during one form session, keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMap {
    values: HashMap<i64, String>,
}

impl ResponseMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, question_id: i64, value: String) {
        self.values.insert(question_id, value);
    }

    pub fn get(&self, question_id: i64) -> Option<&str> {
        self.values.get(&question_id).map(String::as_str)
    }

    /// Whether the question has a response that is non-empty once trimmed.
    pub fn is_filled(&self, question_id: i64) -> bool {
        self.get(question_id)
            .is_some_and(|value| !value.trim().is_empty())
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One user's complete set of responses to one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub evaluation_name: String,
    /// Question label → response value.
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
}

/// Every stored answer record, persisted as a whole.
///
/// Kept as raw JSON so records written by other clients survive a
/// read-append-write untouched, whatever fields or value types they carry.
pub type AnswerCollection = Vec<serde_json::Value>;

impl AnswerRecord {
    /// The record as stored in an [`AnswerCollection`].
    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Read a stored record's evaluation name without decoding the rest.
    pub fn evaluation_name_of(stored: &serde_json::Value) -> Option<&str> {
        stored.get("evaluationName").and_then(serde_json::Value::as_str)
    }
}

/// The logged-in user as kept in local state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    /// Any other fields stored alongside the name.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }
}
