use crate::models::progress::AnswerValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub quiz_id: String,
    /// Percentage of correctly answered questions, rounded.
    pub score: u32,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub time_elapsed: u64,
    pub answers: Vec<Option<AnswerValue>>,
    pub completed_at: DateTime<Utc>,
}
