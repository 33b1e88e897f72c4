use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::warn;

use quiz_core::machine::SessionEvent;
use quiz_core::model::{RawQuestion, Session};
use storage::store::StateStore;

use crate::driver::SessionDriver;
use crate::error::{DriverError, ProviderError, RuntimeError};
use crate::format::format_questions;
use crate::provider::QuestionSource;

const EVENT_BUFFER: usize = 32;
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

type FetchOutcome = Result<Vec<RawQuestion>, ProviderError>;

//
// ─── HANDLE ────────────────────────────────────────────────────────────────────
//

/// Presentation-facing handle to a running quiz loop.
///
/// Cloneable. Events flow in through [`dispatch`](Self::dispatch); state
/// flows out through a watch channel that always holds the latest session.
/// The loop shuts down once every handle has been dropped.
#[derive(Clone)]
pub struct RuntimeHandle {
    events: mpsc::Sender<SessionEvent>,
    state: watch::Receiver<Session>,
}

impl RuntimeHandle {
    /// Queue an event for the session loop.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Closed` once the loop has ended.
    pub async fn dispatch(&self, event: SessionEvent) -> Result<(), RuntimeError> {
        self.events
            .send(event)
            .await
            .map_err(|_| RuntimeError::Closed)
    }

    /// Snapshot of the latest session state.
    #[must_use]
    pub fn current_state(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Wait until the session state changes again.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Closed` once the loop has ended.
    pub async fn changed(&mut self) -> Result<(), RuntimeError> {
        self.state
            .changed()
            .await
            .map_err(|_| RuntimeError::Closed)
    }
}

//
// ─── RUNTIME ───────────────────────────────────────────────────────────────────
//

/// Timer-driven event loop around a [`SessionDriver`].
///
/// Everything that mutates the session funnels through this loop: events
/// from the handles, one-second countdown ticks, and completed question
/// fetches. Transitions therefore apply strictly one at a time, in arrival
/// order, and the provider call is the only work that ever overlaps them.
pub struct QuizRuntime {
    driver: SessionDriver,
    source: Arc<dyn QuestionSource>,
    tick_interval: Duration,
    events: mpsc::Receiver<SessionEvent>,
    state_tx: watch::Sender<Session>,
}

impl QuizRuntime {
    /// Runtime over a fresh default session.
    #[must_use]
    pub fn new(
        store: Arc<dyn StateStore>,
        source: Arc<dyn QuestionSource>,
    ) -> (Self, RuntimeHandle) {
        Self::with_driver(SessionDriver::new(store), source)
    }

    /// Runtime over a session rehydrated from the store.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Storage` when the store cannot be read.
    pub async fn restore(
        store: Arc<dyn StateStore>,
        source: Arc<dyn QuestionSource>,
    ) -> Result<(Self, RuntimeHandle), DriverError> {
        let driver = SessionDriver::restore(store).await?;
        Ok(Self::with_driver(driver, source))
    }

    fn with_driver(driver: SessionDriver, source: Arc<dyn QuestionSource>) -> (Self, RuntimeHandle) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (state_tx, state_rx) = watch::channel(driver.state().clone());

        let runtime = Self {
            driver,
            source,
            tick_interval: DEFAULT_TICK_INTERVAL,
            events: event_rx,
            state_tx,
        };
        let handle = RuntimeHandle {
            events: event_tx,
            state: state_rx,
        };
        (runtime, handle)
    }

    /// Override the one-second countdown period. Tests drive the loop with
    /// millisecond ticks.
    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Drive the session until every handle has been dropped, then return
    /// the final state.
    pub async fn run(mut self) -> Session {
        let (fetch_tx, mut fetch_rx) = mpsc::channel::<FetchOutcome>(1);

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the first immediate tick; the countdown starts a full period
        // after startup.
        ticker.tick().await;

        // A rehydrated session may need attention before any event arrives:
        // an already-expired countdown, or a batch that is still missing.
        self.finish_if_overdue().await;
        let _ = self.state_tx.send(self.driver.state().clone());
        self.maybe_start_fetch(&fetch_tx);

        loop {
            let ticking = self.driver.state().timer_active();

            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else { break };
                    let timer_before = self.driver.state().timer;
                    self.apply(event).await;
                    self.maybe_start_fetch(&fetch_tx);

                    // Remaining time changed (or the countdown just became
                    // live): the next tick is a full period away again.
                    let state = self.driver.state();
                    if state.timer != timer_before || (state.timer_active() && !ticking) {
                        ticker.reset();
                    }
                }
                outcome = fetch_rx.recv() => {
                    if let Some(outcome) = outcome {
                        self.driver.finish_fetch();
                        match outcome {
                            Ok(batch) => {
                                self.apply(SessionEvent::SetQuestions(format_questions(batch)))
                                    .await;
                            }
                            // The session stays in "awaiting questions"; the
                            // next tick triggers another attempt.
                            Err(err) => warn!(error = %err, "question fetch failed"),
                        }
                    }
                }
                _ = ticker.tick(), if ticking => {
                    self.apply(SessionEvent::Tick).await;
                    self.maybe_start_fetch(&fetch_tx);
                }
            }
        }

        self.driver.into_state()
    }

    async fn apply(&mut self, event: SessionEvent) {
        self.driver.dispatch(event).await;
        self.finish_if_overdue().await;
        let _ = self.state_tx.send(self.driver.state().clone());
    }

    /// End a session whose countdown has already expired or whose question
    /// batch has been exhausted without the finish flag being set. Both only
    /// happen with rehydrated snapshots; live play finishes through the
    /// machine itself.
    async fn finish_if_overdue(&mut self) {
        let state = self.driver.state();
        let expired = state.timer <= 0;
        let exhausted = !state.questions.is_empty()
            && state.current_question_index >= state.questions.len();
        if state.timer_active() && (expired || exhausted) {
            self.driver.dispatch(SessionEvent::FinishQuiz).await;
        }
    }

    fn maybe_start_fetch(&mut self, results: &mpsc::Sender<FetchOutcome>) {
        if !self.driver.should_fetch() {
            return;
        }
        self.driver.begin_fetch();

        let source = Arc::clone(&self.source);
        let results = results.clone();
        tokio::spawn(async move {
            let outcome = source.fetch().await;
            // The loop may have shut down while the fetch ran.
            let _ = results.send(outcome).await;
        });
    }
}
