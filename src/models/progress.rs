use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded answer: one option id for single choice, several for multiple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Single(String),
    Multiple(Vec<String>),
}

impl AnswerValue {
    pub fn ids(&self) -> Vec<String> {
        match self {
            AnswerValue::Single(id) => vec![id.clone()],
            AnswerValue::Multiple(ids) => ids.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizProgress {
    pub quiz_id: String,
    pub current_question_index: usize,
    pub answers: Vec<Option<AnswerValue>>,
    pub is_submitted: bool,
    pub is_correct: bool,
    #[serde(default)]
    pub selected_answer_ids: Vec<String>,
    pub saved_at: DateTime<Utc>,
}

impl QuizProgress {
    pub fn new(quiz_id: impl Into<String>, question_count: usize) -> Self {
        Self {
            quiz_id: quiz_id.into(),
            current_question_index: 0,
            answers: vec![None; question_count],
            is_submitted: false,
            is_correct: false,
            selected_answer_ids: Vec::new(),
            saved_at: crate::utils::time::now(),
        }
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_serialize_as_null_string_or_array() {
        let mut progress = QuizProgress::new("q1", 3);
        progress.answers[0] = Some(AnswerValue::Single("a".into()));
        progress.answers[2] = Some(AnswerValue::Multiple(vec!["a".into(), "c".into()]));

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["answers"], serde_json::json!(["a", null, ["a", "c"]]));
        assert_eq!(json["quizId"], "q1");
        assert_eq!(progress.answered_count(), 2);
    }
}
