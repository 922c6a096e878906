use crate::models::progress::AnswerValue;
use crate::models::quiz::Quiz;
use crate::models::quiz_result::QuizResult;
use crate::services::validation_service::validate_answer;
use crate::utils::time::now;

pub struct GradingService;

impl GradingService {
    /// Scores a finished attempt. `answers` is positional, one slot per question;
    /// missing slots count as unanswered.
    pub fn grade(quiz: &Quiz, answers: &[Option<AnswerValue>], time_elapsed_secs: u64) -> QuizResult {
        let total_questions = quiz.questions.len();
        let correct_answers = quiz
            .questions
            .iter()
            .enumerate()
            .filter(|(idx, q)| {
                answers
                    .get(*idx)
                    .and_then(|a| a.as_ref())
                    .is_some_and(|a| validate_answer(q, &a.ids()))
            })
            .count();

        let score = if total_questions > 0 {
            ((correct_answers as f64 / total_questions as f64) * 100.0).round() as u32
        } else {
            0
        };

        let mut recorded = answers.to_vec();
        recorded.resize(total_questions.max(answers.len()), None);

        QuizResult {
            quiz_id: quiz.id.clone(),
            score,
            total_questions,
            correct_answers,
            time_elapsed: time_elapsed_secs,
            answers: recorded,
            completed_at: now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::answer::Answer;
    use crate::models::question::{Question, QuestionType};
    use crate::models::quiz::Locale;

    fn quiz() -> Quiz {
        let q = |id: i64, kind: QuestionType, correct: &[&str]| Question {
            id,
            question: format!("Q{}", id),
            question_type: kind,
            options: ["a", "b", "c"].iter().map(|o| Answer::new(*o, *o)).collect(),
            correct_answer_ids: correct.iter().map(|s| s.to_string()).collect(),
            explanation: String::new(),
            difficulty: None,
        };
        Quiz {
            id: "q1".into(),
            language: Locale::En,
            title: "T".into(),
            description: "D".into(),
            categories: vec![],
            difficulty: "beginner".into(),
            time_limit: 60,
            questions: vec![
                q(1, QuestionType::Single, &["a"]),
                q(2, QuestionType::Multiple, &["a", "c"]),
                q(3, QuestionType::Single, &["b"]),
            ],
            tags: vec![],
            last_updated: String::new(),
        }
    }

    #[test]
    fn grades_single_and_multiple_answers() {
        let answers = vec![
            Some(AnswerValue::Single("a".into())),
            Some(AnswerValue::Multiple(vec!["c".into(), "a".into()])),
            Some(AnswerValue::Single("c".into())),
        ];
        let result = GradingService::grade(&quiz(), &answers, 42);
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.total_questions, 3);
        assert_eq!(result.score, 67);
        assert_eq!(result.time_elapsed, 42);
    }

    #[test]
    fn unanswered_slots_are_padded_and_wrong() {
        let result = GradingService::grade(&quiz(), &[Some(AnswerValue::Single("a".into()))], 5);
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.answers.len(), 3);
        assert_eq!(result.answers[2], None);
        assert_eq!(result.score, 33);
    }
}
