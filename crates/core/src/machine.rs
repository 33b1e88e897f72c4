use crate::model::{Question, Session};

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Everything that can happen to a quiz session.
///
/// Events are plain data; they carry no behavior of their own. The enum is
/// closed on purpose: [`transition`] matches exhaustively, so every event has
/// a defined outcome and the machine is total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// User submitted a display name. Callers reject blank names before
    /// dispatching; the machine applies whatever it is given.
    Login(String),
    /// A formatted question batch arrived from the provider.
    SetQuestions(Vec<Question>),
    /// User picked a choice for the current question.
    AnswerQuestion(String),
    /// One second of countdown elapsed.
    Tick,
    /// Countdown ran out (or an external actor ended the quiz).
    FinishQuiz,
    /// Replace the whole session with a rehydrated snapshot.
    LoadState(Session),
    /// Throw everything away and start over.
    Reset,
}

//
// ─── TRANSITION ────────────────────────────────────────────────────────────────
//

/// Advance a session by one event.
///
/// Pure and total: consumes the old state, returns the new one, touches
/// nothing else. All quiz behavior lives here; the surrounding runtime only
/// decides *when* to feed events in.
///
/// # Examples
///
/// ```
/// use quiz_core::machine::{SessionEvent, transition};
/// use quiz_core::model::Session;
///
/// let state = transition(Session::default(), SessionEvent::Login("alice".into()));
/// assert!(state.is_logged_in);
/// assert_eq!(state.username, "alice");
/// ```
#[must_use]
pub fn transition(state: Session, event: SessionEvent) -> Session {
    match event {
        SessionEvent::Login(username) => Session {
            username,
            is_logged_in: true,
            ..state
        },
        SessionEvent::SetQuestions(questions) => Session { questions, ..state },
        SessionEvent::AnswerQuestion(choice) => answer(state, &choice),
        SessionEvent::Tick => {
            let timer = state.timer.saturating_sub(1);
            Session {
                timer,
                // No floor at zero: the countdown may read negative if ticks
                // keep arriving, exactly like the reference implementation.
                is_quiz_finished: timer <= 0 || state.is_quiz_finished,
                ..state
            }
        }
        SessionEvent::FinishQuiz => Session {
            is_quiz_finished: true,
            ..state
        },
        SessionEvent::LoadState(snapshot) => snapshot,
        SessionEvent::Reset => Session::default(),
    }
}

/// Score a picked choice against the current question.
///
/// Ignored entirely once the quiz is finished or the index has run past the
/// loaded batch (a snapshot can legally sit at `index == len`), so stray
/// answer events can never corrupt the tallies.
fn answer(state: Session, choice: &str) -> Session {
    if state.is_quiz_finished || state.current_question_index >= state.questions.len() {
        return state;
    }

    // Exact string match, no trimming or entity decoding.
    let correct = state.questions[state.current_question_index].correct_answer == choice;
    let next_index = state.current_question_index + 1;

    Session {
        correct_answers: if correct {
            state.correct_answers.saturating_add(1)
        } else {
            state.correct_answers
        },
        wrong_answers: if correct {
            state.wrong_answers
        } else {
            state.wrong_answers.saturating_add(1)
        },
        total_answered: state.total_answered.saturating_add(1),
        current_question_index: next_index,
        is_quiz_finished: next_index >= state.questions.len() || state.timer <= 0,
        ..state
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
