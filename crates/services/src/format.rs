use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::model::{Question, RawQuestion};

/// Turn raw provider records into playable questions.
///
/// Ids are the 1-based positions within the batch. Question and answer text
/// passes through byte-for-byte, HTML entities included; rendering is the
/// presentation layer's problem. The correct answer is mixed in with the
/// incorrect ones and the combined choices are shuffled uniformly, so its
/// position carries no information.
#[must_use]
pub fn format_questions(raw: Vec<RawQuestion>) -> Vec<Question> {
    let mut rng = rng();

    raw.into_iter()
        .enumerate()
        .map(|(position, record)| {
            let mut choices = record.incorrect_answers;
            choices.push(record.correct_answer.clone());
            choices.as_mut_slice().shuffle(&mut rng);

            Question {
                id: u32::try_from(position + 1).unwrap_or(u32::MAX),
                question: record.question,
                choices,
                correct_answer: record.correct_answer,
            }
        })
        .collect()
}
