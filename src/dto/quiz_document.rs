use serde::{Deserialize, Serialize};
use validator::Validate;

/// A quiz document as it sits in the document store, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawQuizDocument {
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(length(min = 1, message = "Quiz id must not be empty"))]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "trim_optional_string")]
    pub language: Option<String>,

    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,
    pub categories: Option<Vec<String>>,

    #[serde(default, deserialize_with = "trim_optional_string")]
    pub difficulty: Option<String>,

    /// Seconds; absent or `0` means the default limit.
    #[validate(range(min = 0, message = "Time limit must not be negative"))]
    pub time_limit: Option<i64>,

    pub tags: Option<Vec<String>>,

    #[serde(default, deserialize_with = "trim_optional_string")]
    pub last_updated: Option<String>,

    pub questions: Option<Vec<RawQuestion>>,
}

impl RawQuizDocument {
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id.is_none() {
            missing.push("id");
        }
        if self.title.is_none() {
            missing.push("title");
        }
        if self.description.is_none() {
            missing.push("description");
        }
        if self.questions.is_none() {
            missing.push("questions");
        }
        missing
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    pub id: Option<i64>,

    #[validate(length(min = 1, message = "Question text must not be empty"))]
    pub question: Option<String>,

    #[serde(rename = "type")]
    pub question_type: Option<String>,

    #[serde(default)]
    pub options: Vec<RawOption>,

    pub correct_answer_ids: Option<Vec<String>>,
    pub correct_answers: Option<RawCorrectAnswers>,

    #[serde(default, deserialize_with = "trim_optional_string")]
    pub explanation: Option<String>,

    #[serde(default, deserialize_with = "trim_optional_string")]
    pub difficulty: Option<String>,
}

/// Options come either as bare strings (legacy) or as `{id, text}` objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOption {
    Text(String),
    Object {
        id: Option<String>,
        text: Option<String>,
    },
}

/// Legacy correctness reference: an option position or an option's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswerRef {
    Index(i64),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCorrectAnswers {
    Many(Vec<RawAnswerRef>),
    One(RawAnswerRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionShape<'a> {
    Bare(&'a str),
    Identified { id: &'a str, text: &'a str },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CorrectnessShape<'a> {
    Ids(&'a [String]),
    Legacy(Vec<&'a RawAnswerRef>),
}

impl RawOption {
    pub fn shape(&self) -> Result<OptionShape<'_>, String> {
        match self {
            RawOption::Text(text) => Ok(OptionShape::Bare(text)),
            RawOption::Object { id, text } => {
                let id = id
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| "option is missing an id".to_string())?;
                let text = text
                    .as_deref()
                    .ok_or_else(|| format!("option '{}' is missing its text", id))?;
                Ok(OptionShape::Identified { id, text })
            }
        }
    }
}

impl RawQuestion {
    /// Identifier-based correctness wins when it carries anything; otherwise
    /// fall back to the legacy `correctAnswers` field.
    pub fn correctness(&self) -> Option<CorrectnessShape<'_>> {
        match (&self.correct_answer_ids, &self.correct_answers) {
            (Some(ids), _) if !ids.is_empty() => Some(CorrectnessShape::Ids(ids)),
            (_, Some(RawCorrectAnswers::Many(refs))) => {
                Some(CorrectnessShape::Legacy(refs.iter().collect()))
            }
            (_, Some(RawCorrectAnswers::One(one))) => Some(CorrectnessShape::Legacy(vec![one])),
            (Some(ids), None) => Some(CorrectnessShape::Ids(ids)),
            (None, None) => None,
        }
    }
}

/// Trims strings; blank ones become `None`.
fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}
