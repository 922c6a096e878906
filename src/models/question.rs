use crate::models::answer::Answer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Single,
    Multiple,
}

impl QuestionType {
    /// Anything other than `multiple` is a single-choice question.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some(t) if t.eq_ignore_ascii_case("multiple") => QuestionType::Multiple,
            _ => QuestionType::Single,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<Answer>,
    pub correct_answer_ids: Vec<String>,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl Question {
    pub fn option(&self, id: &str) -> Option<&Answer> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn is_multiple(&self) -> bool {
        self.question_type == QuestionType::Multiple
    }
}
