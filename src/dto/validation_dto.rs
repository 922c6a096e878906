use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Correct,
    Incorrect,
    Error,
}

impl Indicator {
    pub fn color(&self) -> &'static str {
        match self {
            Indicator::Correct => "success",
            Indicator::Incorrect | Indicator::Error => "error",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Indicator::Correct => "mdi-check-circle",
            Indicator::Incorrect => "mdi-close-circle",
            Indicator::Error => "mdi-alert-circle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_correct: bool,
    pub correct_answer_ids: Vec<String>,
    pub explanation: String,
    pub indicator: Indicator,
    pub color: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn graded(is_correct: bool, correct_answer_ids: Vec<String>, explanation: String) -> Self {
        let indicator = if is_correct {
            Indicator::Correct
        } else {
            Indicator::Incorrect
        };
        Self {
            is_correct,
            correct_answer_ids,
            explanation,
            indicator,
            color: indicator.color().to_string(),
            icon: indicator.icon().to_string(),
            message: None,
        }
    }

    /// Neutral failure for lookups that went nowhere.
    pub fn lookup_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            is_correct: false,
            correct_answer_ids: Vec::new(),
            explanation: message.clone(),
            indicator: Indicator::Error,
            color: Indicator::Error.color().to_string(),
            icon: Indicator::Error.icon().to_string(),
            message: Some(message),
        }
    }
}
