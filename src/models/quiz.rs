use crate::models::question::Question;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TIME_LIMIT_SECS: u32 = 300;
pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_DIFFICULTY: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Locale::ALL
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(tag))
            .ok_or_else(|| format!("unsupported locale '{}'", tag))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub language: Locale,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    pub difficulty: String,
    pub time_limit: u32,
    pub questions: Vec<Question>,
    pub tags: Vec<String>,
    pub last_updated: String,
}

impl Quiz {
    pub fn question(&self, question_id: i64) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn estimated_minutes(&self) -> u32 {
        self.time_limit.div_ceil(60)
    }
}

/// Listing projection of a [`Quiz`]; never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizMetadata {
    pub id: String,
    pub language: Locale,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    pub difficulty: String,
    pub time_limit: u32,
    pub question_count: usize,
    pub estimated_time: u32,
    pub tags: Vec<String>,
    pub last_updated: String,
}

impl From<&Quiz> for QuizMetadata {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id.clone(),
            language: quiz.language,
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            categories: quiz.categories.clone(),
            difficulty: quiz.difficulty.clone(),
            time_limit: quiz.time_limit,
            question_count: quiz.questions.len(),
            estimated_time: quiz.estimated_minutes(),
            tags: quiz.tags.clone(),
            last_updated: quiz.last_updated.clone(),
        }
    }
}
