use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::{Question, RawQuestion};
use services::{
    ProviderError, QuestionSource, QuizRuntime, RuntimeHandle, STATE_KEY, Session, SessionEvent,
    USERNAME_KEY, decode_snapshot,
};
use storage::store::{InMemoryStore, StateStore};

struct FixedSource {
    batch: Vec<RawQuestion>,
}

#[async_trait]
impl QuestionSource for FixedSource {
    async fn fetch(&self) -> Result<Vec<RawQuestion>, ProviderError> {
        Ok(self.batch.clone())
    }
}

struct NeverSource;

#[async_trait]
impl QuestionSource for NeverSource {
    async fn fetch(&self) -> Result<Vec<RawQuestion>, ProviderError> {
        std::future::pending().await
    }
}

fn raw_batch(count: usize) -> Vec<RawQuestion> {
    (1..=count)
        .map(|id| RawQuestion {
            question: format!("Q{id}"),
            correct_answer: format!("right {id}"),
            incorrect_answers: vec![format!("wrong {id}a"), format!("wrong {id}b")],
        })
        .collect()
}

fn question(id: u32) -> Question {
    Question {
        id,
        question: format!("Q{id}"),
        choices: vec![format!("right {id}"), format!("wrong {id}")],
        correct_answer: format!("right {id}"),
    }
}

async fn wait_until(handle: &mut RuntimeHandle, predicate: impl Fn(&Session) -> bool) -> Session {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = handle.current_state();
            if predicate(&state) {
                return state;
            }
            handle.changed().await.expect("runtime closed while waiting");
        }
    })
    .await
    .expect("condition not reached in time")
}

#[tokio::test]
async fn full_quiz_flow_persists_every_step() {
    let store = Arc::new(InMemoryStore::new());
    let source = Arc::new(FixedSource {
        batch: raw_batch(3),
    });
    let (runtime, mut handle) = QuizRuntime::new(store.clone(), source);
    let task = tokio::spawn(runtime.with_tick_interval(Duration::from_millis(20)).run());

    handle
        .dispatch(SessionEvent::Login("zoe".into()))
        .await
        .unwrap();
    let state = wait_until(&mut handle, |s| !s.questions.is_empty()).await;
    assert_eq!(state.username, "zoe");
    assert_eq!(state.questions.len(), 3);

    // First question right, second wrong, third right.
    for (index, answer_right) in [true, false, true].into_iter().enumerate() {
        let state = handle.current_state();
        let question = state.questions[index].clone();
        let choice = if answer_right {
            question.correct_answer.clone()
        } else {
            question
                .choices
                .iter()
                .find(|choice| **choice != question.correct_answer)
                .expect("a wrong choice")
                .clone()
        };
        handle
            .dispatch(SessionEvent::AnswerQuestion(choice))
            .await
            .unwrap();
        let answered = u32::try_from(index + 1).unwrap();
        wait_until(&mut handle, move |s| s.total_answered == answered).await;
    }

    let state = wait_until(&mut handle, |s| s.is_quiz_finished).await;
    assert_eq!(state.correct_answers, 2);
    assert_eq!(state.wrong_answers, 1);
    assert_eq!(state.total_answered, 3);
    assert_eq!(state.current_question_index, 3);

    let raw = store.get(STATE_KEY).await.unwrap().expect("snapshot slot");
    assert_eq!(decode_snapshot(&raw).unwrap(), state);
    let name = store.get(USERNAME_KEY).await.unwrap();
    assert_eq!(name.as_deref(), Some("zoe"));

    drop(handle);
    let final_state = task.await.unwrap();
    assert_eq!(final_state, state);
}

#[tokio::test]
async fn countdown_expires_before_questions_arrive() {
    let store = Arc::new(InMemoryStore::new());
    let (runtime, mut handle) = QuizRuntime::new(store, Arc::new(NeverSource));
    let task = tokio::spawn(runtime.with_tick_interval(Duration::from_millis(5)).run());

    handle
        .dispatch(SessionEvent::Login("ada".into()))
        .await
        .unwrap();
    let state = wait_until(&mut handle, |s| s.is_quiz_finished).await;

    assert_eq!(state.timer, 0);
    assert_eq!(state.total_answered, 0);
    assert!(state.questions.is_empty());

    drop(handle);
    task.await.unwrap();
}

#[tokio::test]
async fn restored_session_resumes_and_completes() {
    let store = Arc::new(InMemoryStore::new());
    let snapshot = Session {
        username: "noor".into(),
        is_logged_in: true,
        questions: vec![question(1), question(2), question(3)],
        current_question_index: 2,
        correct_answers: 1,
        wrong_answers: 1,
        total_answered: 2,
        is_quiz_finished: false,
        timer: 7,
    };
    store
        .set(STATE_KEY, &serde_json::to_string(&snapshot).unwrap())
        .await
        .unwrap();
    store.set(USERNAME_KEY, "noor").await.unwrap();

    let (runtime, mut handle) = QuizRuntime::restore(store.clone(), Arc::new(NeverSource))
        .await
        .unwrap();
    assert_eq!(handle.current_state(), snapshot);

    let task = tokio::spawn(runtime.with_tick_interval(Duration::from_millis(20)).run());

    let last = snapshot.questions[2].clone();
    handle
        .dispatch(SessionEvent::AnswerQuestion(last.correct_answer))
        .await
        .unwrap();

    let state = wait_until(&mut handle, |s| s.is_quiz_finished).await;
    assert_eq!(state.username, "noor");
    assert_eq!(state.correct_answers, 2);
    assert_eq!(state.wrong_answers, 1);
    assert_eq!(state.total_answered, 3);

    drop(handle);
    task.await.unwrap();
}

#[tokio::test]
async fn reset_clears_the_persisted_snapshot() {
    let store = Arc::new(InMemoryStore::new());
    let source = Arc::new(FixedSource {
        batch: raw_batch(2),
    });
    let (runtime, mut handle) = QuizRuntime::new(store.clone(), source);
    let task = tokio::spawn(runtime.with_tick_interval(Duration::from_millis(20)).run());

    handle
        .dispatch(SessionEvent::Login("pat".into()))
        .await
        .unwrap();
    wait_until(&mut handle, |s| !s.questions.is_empty()).await;

    handle.dispatch(SessionEvent::Reset).await.unwrap();
    let state = wait_until(&mut handle, |s| !s.is_logged_in).await;

    assert_eq!(state, Session::default());
    let raw = store.get(STATE_KEY).await.unwrap().expect("snapshot slot");
    assert_eq!(decode_snapshot(&raw).unwrap(), Session::default());
    let name = store.get(USERNAME_KEY).await.unwrap();
    assert_eq!(name.as_deref(), Some(""));

    drop(handle);
    task.await.unwrap();
}
