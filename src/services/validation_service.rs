use crate::dto::validation_dto::ValidationResult;
use crate::models::question::Question;
use crate::services::cache_service::QuizCache;
use crate::services::locale_service::LocaleService;
use std::sync::Arc;
use tracing::warn;

/// Order-independent comparison of a submission against the correct set.
///
/// Submissions are not de-duplicated: `["a", "a"]` against `{a}` is wrong.
pub fn validate_answer(question: &Question, submitted: &[String]) -> bool {
    if submitted.is_empty() || question.correct_answer_ids.is_empty() {
        return false;
    }
    if submitted.len() != question.correct_answer_ids.len() {
        return false;
    }

    let mut submitted: Vec<&str> = submitted.iter().map(String::as_str).collect();
    let mut correct: Vec<&str> = question
        .correct_answer_ids
        .iter()
        .map(String::as_str)
        .collect();
    submitted.sort_unstable();
    correct.sort_unstable();
    submitted == correct
}

#[derive(Clone)]
pub struct ValidationService {
    cache: Arc<QuizCache>,
    locale: LocaleService,
}

impl ValidationService {
    pub fn new(cache: Arc<QuizCache>, locale: LocaleService) -> Self {
        Self { cache, locale }
    }

    /// Resolves quiz and question, then grades. Unknown ids come back as a
    /// neutral failure rather than an error.
    pub async fn check_answer(
        &self,
        quiz_id: &str,
        question_id: i64,
        submitted: &[String],
    ) -> ValidationResult {
        let quizzes = self.cache.get(self.locale.current()).await;

        let Some(quiz) = quizzes.iter().find(|q| q.id == quiz_id) else {
            warn!(quiz_id, "Validation requested for unknown quiz");
            return ValidationResult::lookup_failed(format!("Quiz '{}' not found", quiz_id));
        };
        let Some(question) = quiz.question(question_id) else {
            warn!(quiz_id, question_id, "Validation requested for unknown question");
            return ValidationResult::lookup_failed(format!(
                "Question {} not found in quiz '{}'",
                question_id, quiz_id
            ));
        };

        ValidationResult::graded(
            validate_answer(question, submitted),
            question.correct_answer_ids.clone(),
            question.explanation.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answer::Answer;
    use crate::models::question::QuestionType;

    fn question(correct: &[&str]) -> Question {
        Question {
            id: 1,
            question: "Q".into(),
            question_type: if correct.len() > 1 {
                QuestionType::Multiple
            } else {
                QuestionType::Single
            },
            options: ["a", "b", "c"].iter().map(|id| Answer::new(*id, *id)).collect(),
            correct_answer_ids: correct.iter().map(|s| s.to_string()).collect(),
            explanation: "E".into(),
            difficulty: None,
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_choice() {
        let q = question(&["a"]);
        assert!(validate_answer(&q, &ids(&["a"])));
        assert!(!validate_answer(&q, &ids(&["b"])));
        assert!(!validate_answer(&q, &[]));
    }

    #[test]
    fn multiple_choice_is_order_independent() {
        let q = question(&["a", "c"]);
        assert!(validate_answer(&q, &ids(&["c", "a"])));
        assert!(validate_answer(&question(&["c", "a"]), &ids(&["a", "c"])));
        assert!(!validate_answer(&q, &ids(&["a"])));
        assert!(!validate_answer(&q, &ids(&["a", "b"])));
        assert!(!validate_answer(&q, &ids(&["a", "c", "b"])));
    }

    #[test]
    fn duplicate_submission_is_rejected() {
        assert!(!validate_answer(&question(&["a"]), &ids(&["a", "a"])));
        assert!(!validate_answer(&question(&["a", "c"]), &ids(&["a", "a"])));
    }

    #[test]
    fn empty_correct_set_never_validates() {
        assert!(!validate_answer(&question(&[]), &ids(&["a"])));
    }
}
