use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Question;

/// Seconds on the countdown when a fresh session starts.
pub const INITIAL_TIMER_SECS: i32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionInvariantError {
    #[error("question index {index} exceeds question count {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("answer counts do not add up: {correct} correct + {wrong} wrong != {total} total")]
    CountMismatch { correct: u32, wrong: u32, total: u32 },

    #[error("total answered ({total}) does not match question index ({index})")]
    IndexMismatch { total: u32, index: usize },
}

/// Full state of one quiz attempt.
///
/// This is also the persisted snapshot shape: fields serialize under the
/// camelCase names the browser reference stored (`isLoggedIn`,
/// `currentQuestionIndex`, …), so snapshots written by either implementation
/// rehydrate in the other. The session is only ever replaced wholesale by
/// [`crate::machine::transition`]; nothing mutates it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Display name, empty until login.
    pub username: String,
    pub is_logged_in: bool,
    /// Loaded question batch, empty while awaiting the provider.
    pub questions: Vec<Question>,
    /// Position of the question currently being asked; equals
    /// `questions.len()` once every question has been answered.
    pub current_question_index: usize,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    pub total_answered: u32,
    pub is_quiz_finished: bool,
    /// Seconds remaining. Signed: ticks past expiry are not clamped.
    pub timer: i32,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            username: String::new(),
            is_logged_in: false,
            questions: Vec::new(),
            current_question_index: 0,
            correct_answers: 0,
            wrong_answers: 0,
            total_answered: 0,
            is_quiz_finished: false,
            timer: INITIAL_TIMER_SECS,
        }
    }
}

impl Session {
    /// True while a fresh question batch is needed: logged in, nothing
    /// loaded, session still running.
    #[must_use]
    pub fn awaiting_questions(&self) -> bool {
        self.is_logged_in && self.questions.is_empty() && !self.is_quiz_finished
    }

    /// True while the countdown should be running: logged in and not
    /// finished. The countdown runs even while questions are still loading.
    #[must_use]
    pub fn timer_active(&self) -> bool {
        self.is_logged_in && !self.is_quiz_finished
    }

    /// Verify the counting invariants a well-formed session upholds: the
    /// index never exceeds the question count, the correct and wrong tallies
    /// sum to the total, and the total matches the index.
    ///
    /// The transition function preserves these by construction; this check
    /// exists for rehydration, where a snapshot from the store is untrusted.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn check_consistency(&self) -> Result<(), SessionInvariantError> {
        if self.current_question_index > self.questions.len() {
            return Err(SessionInvariantError::IndexOutOfBounds {
                index: self.current_question_index,
                len: self.questions.len(),
            });
        }

        let sum = self.correct_answers.saturating_add(self.wrong_answers);
        if sum != self.total_answered {
            return Err(SessionInvariantError::CountMismatch {
                correct: self.correct_answers,
                wrong: self.wrong_answers,
                total: self.total_answered,
            });
        }

        if usize::try_from(self.total_answered) != Ok(self.current_question_index) {
            return Err(SessionInvariantError::IndexMismatch {
                total: self.total_answered,
                index: self.current_question_index,
            });
        }

        Ok(())
    }
}
