use crate::dto::quiz_document::{
    CorrectnessShape, OptionShape, RawAnswerRef, RawQuestion, RawQuizDocument,
};
use crate::error::{Error, Result};
use crate::models::answer::Answer;
use crate::models::question::{Question, QuestionType};
use crate::models::quiz::{
    Locale, Quiz, DEFAULT_CATEGORY, DEFAULT_DIFFICULTY, DEFAULT_TIME_LIMIT_SECS,
};
use crate::services::document_source::{DocumentSource, RawDocument};
use crate::utils::option_id::{OptionIdGenerator, OptionIdStrategy};
use crate::utils::time::{now, to_rfc3339};
use crate::utils::validation::validate;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_EXPLANATION: &str = "No explanation provided.";

#[derive(Clone)]
pub struct QuizLoader {
    source: Arc<dyn DocumentSource>,
    option_ids: OptionIdStrategy,
}

impl QuizLoader {
    pub fn new(source: Arc<dyn DocumentSource>, option_ids: OptionIdStrategy) -> Self {
        Self { source, option_ids }
    }

    /// Every valid quiz, in discovery order. Invalid documents are logged and skipped.
    pub async fn load_all(&self) -> Result<Vec<Quiz>> {
        let documents = self.source.documents().await?;
        let total = documents.len();

        let quizzes: Vec<Quiz> = documents
            .iter()
            .filter_map(|doc| match parse_document(doc, self.option_ids) {
                Ok(quiz) => Some(quiz),
                Err(e) => {
                    warn!(
                        document = %doc.name,
                        kind = e.kind(),
                        error = %e,
                        "Quiz document failed validation and will be skipped"
                    );
                    None
                }
            })
            .collect();

        debug!(total, valid = quizzes.len(), "Loaded quiz documents");
        Ok(quizzes)
    }

    /// Quizzes visible under `locale`, in discovery order.
    pub async fn load_locale(&self, locale: Locale) -> Result<Vec<Quiz>> {
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .filter(|quiz| quiz.language == locale)
            .collect())
    }
}

pub fn parse_document(doc: &RawDocument, option_ids: OptionIdStrategy) -> Result<Quiz> {
    let raw: RawQuizDocument = serde_json::from_str(&doc.contents)?;
    normalize_document(raw, option_ids)
}

pub fn normalize_document(raw: RawQuizDocument, option_ids: OptionIdStrategy) -> Result<Quiz> {
    let missing = raw.missing_required_fields();
    if !missing.is_empty() {
        return Err(Error::InvalidDocument(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }
    validate(&raw)?;

    let language = match raw.language.as_deref() {
        None => Locale::default(),
        Some(tag) => tag.parse::<Locale>().map_err(Error::InvalidDocument)?,
    };

    let time_limit = match raw.time_limit {
        None | Some(0) => DEFAULT_TIME_LIMIT_SECS,
        Some(secs) => u32::try_from(secs)
            .map_err(|_| Error::InvalidDocument(format!("time limit {} out of range", secs)))?,
    };

    let raw_questions = raw.questions.unwrap_or_default();
    if raw_questions.is_empty() {
        return Err(Error::InvalidDocument(
            "quiz must have at least one question".to_string(),
        ));
    }

    let mut questions = Vec::with_capacity(raw_questions.len());
    let mut seen_ids = HashSet::new();
    for (position, raw_question) in raw_questions.iter().enumerate() {
        let question = normalize_question(raw_question, position, option_ids).map_err(|e| {
            Error::InvalidDocument(format!("question #{}: {}", position + 1, e))
        })?;
        if !seen_ids.insert(question.id) {
            return Err(Error::InvalidDocument(format!(
                "duplicate question id {}",
                question.id
            )));
        }
        questions.push(question);
    }

    Ok(Quiz {
        id: raw.id.unwrap_or_default(),
        language,
        title: raw.title.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        categories: raw
            .categories
            .unwrap_or_else(|| vec![DEFAULT_CATEGORY.to_string()]),
        difficulty: raw
            .difficulty
            .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
        time_limit,
        questions,
        tags: raw.tags.unwrap_or_default(),
        last_updated: raw.last_updated.unwrap_or_else(|| to_rfc3339(now())),
    })
}

pub fn normalize_question(
    raw: &RawQuestion,
    position: usize,
    option_ids: OptionIdStrategy,
) -> Result<Question> {
    validate(raw)?;
    let text = raw
        .question
        .clone()
        .ok_or_else(|| Error::InvalidDocument("question text is missing".to_string()))?;
    let id = raw.id.filter(|id| *id != 0).unwrap_or(position as i64 + 1);

    if raw.options.is_empty() {
        return Err(Error::InvalidDocument("question has no options".to_string()));
    }

    let mut ids = OptionIdGenerator::new(option_ids, id);
    let mut options = Vec::with_capacity(raw.options.len());
    for (idx, raw_option) in raw.options.iter().enumerate() {
        let option = match raw_option.shape().map_err(Error::InvalidDocument)? {
            OptionShape::Bare(text) => Answer::new(ids.next_id(idx, text), text),
            OptionShape::Identified { id, text } => Answer::new(id, text),
        };
        if options.iter().any(|o: &Answer| o.id == option.id) {
            return Err(Error::InvalidDocument(format!(
                "duplicate option id '{}'",
                option.id
            )));
        }
        options.push(option);
    }

    let correct_answer_ids = match raw.correctness() {
        None => Vec::new(),
        Some(CorrectnessShape::Ids(correct)) => {
            for cid in correct {
                if !options.iter().any(|o| &o.id == cid) {
                    return Err(Error::InvalidDocument(format!(
                        "correct answer id '{}' does not reference an option",
                        cid
                    )));
                }
            }
            dedup_preserving_order(correct.iter().cloned())
        }
        Some(CorrectnessShape::Legacy(refs)) => {
            dedup_preserving_order(refs.into_iter().filter_map(|r| {
                let resolved = resolve_legacy_ref(&options, r);
                if resolved.is_none() {
                    warn!(question_id = id, reference = ?r, "Dropping unresolvable legacy answer");
                }
                resolved
            }))
        }
    };

    if correct_answer_ids.is_empty() {
        return Err(Error::InvalidDocument(
            "question must have correct answers".to_string(),
        ));
    }

    Ok(Question {
        id,
        question: text,
        question_type: QuestionType::from_tag(raw.question_type.as_deref()),
        options,
        correct_answer_ids,
        explanation: raw
            .explanation
            .clone()
            .unwrap_or_else(|| DEFAULT_EXPLANATION.to_string()),
        difficulty: raw.difficulty.clone(),
    })
}

fn resolve_legacy_ref(options: &[Answer], reference: &RawAnswerRef) -> Option<String> {
    match reference {
        RawAnswerRef::Index(idx) => usize::try_from(*idx)
            .ok()
            .and_then(|i| options.get(i))
            .map(|o| o.id.clone()),
        RawAnswerRef::Text(text) => options
            .iter()
            .find(|o| &o.text == text)
            .or_else(|| options.iter().find(|o| &o.id == text))
            .map(|o| o.id.clone()),
    }
}

fn dedup_preserving_order(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
