use crate::models::question::Question;
use crate::models::quiz::Quiz;
use rand::Rng;
use tracing::warn;

/// Uniform in-place permutation: walk from the last index down to 1 and swap
/// each slot with a uniformly chosen index at or below it.
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Same question with its options in a fresh random order. Correct ids are
/// position independent, so they are carried over as-is, minus any that no
/// longer resolve to an option.
pub fn shuffle_question<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Question {
    let mut options = question.options.clone();
    fisher_yates(&mut options, rng);

    let correct_answer_ids = question
        .correct_answer_ids
        .iter()
        .filter(|id| {
            let known = options.iter().any(|o| &o.id == *id);
            if !known {
                warn!(
                    question_id = question.id,
                    answer_id = %id,
                    "Dropping correct answer id with no matching option"
                );
            }
            known
        })
        .cloned()
        .collect();

    Question {
        options,
        correct_answer_ids,
        ..question.clone()
    }
}

pub fn shuffle_quiz<R: Rng + ?Sized>(quiz: &Quiz, rng: &mut R) -> Quiz {
    Quiz {
        questions: quiz
            .questions
            .iter()
            .map(|q| shuffle_question(q, rng))
            .collect(),
        ..quiz.clone()
    }
}
