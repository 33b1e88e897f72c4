use std::mem;
use std::sync::Arc;

use tracing::warn;

use quiz_core::machine::{SessionEvent, transition};
use quiz_core::model::Session;
use storage::store::StateStore;

use crate::error::{DriverError, SnapshotError};

/// Store slot holding the JSON session snapshot.
pub const STATE_KEY: &str = "quizState";
/// Store slot holding the raw username.
pub const USERNAME_KEY: &str = "username";

/// Decode and validate a persisted session snapshot.
///
/// # Errors
///
/// Returns `SnapshotError` if the JSON does not parse as a session or the
/// decoded session violates the counting invariants.
pub fn decode_snapshot(raw: &str) -> Result<Session, SnapshotError> {
    let session: Session = serde_json::from_str(raw)?;
    session.check_consistency()?;
    Ok(session)
}

/// Owns the live session and keeps the store in sync with it.
///
/// Every dispatched event runs through the pure transition function; the
/// resulting state is then written to the two store slots in one atomic
/// batch. The driver also carries the single-flight flag for question
/// fetches, so at most one provider call is outstanding at a time.
pub struct SessionDriver {
    store: Arc<dyn StateStore>,
    state: Session,
    fetch_in_flight: bool,
}

impl SessionDriver {
    /// Driver over a fresh default session, ignoring whatever the store
    /// holds.
    #[must_use]
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            state: Session::default(),
            fetch_in_flight: false,
        }
    }

    /// Rehydrate a driver from the store.
    ///
    /// Replays the snapshot slot first and the username slot second, the
    /// order the browser reference used. A snapshot that fails to decode or
    /// breaks the session invariants is discarded with a warning and the
    /// defaults stand until the next dispatch rewrites the slot; a stored
    /// username that is blank after trimming is ignored.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::Storage` when the slots cannot be read at all.
    pub async fn restore(store: Arc<dyn StateStore>) -> Result<Self, DriverError> {
        let mut driver = Self::new(store);

        if let Some(raw) = driver.store.get(STATE_KEY).await? {
            match decode_snapshot(&raw) {
                Ok(snapshot) => driver.apply(SessionEvent::LoadState(snapshot)),
                Err(err) => warn!(error = %err, "discarding unusable session snapshot"),
            }
        }

        if let Some(stored) = driver.store.get(USERNAME_KEY).await? {
            if !stored.trim().is_empty() {
                driver.apply(SessionEvent::Login(stored));
            }
        }

        Ok(driver)
    }

    #[must_use]
    pub fn state(&self) -> &Session {
        &self.state
    }

    /// Consume the driver, yielding the final session.
    #[must_use]
    pub fn into_state(self) -> Session {
        self.state
    }

    /// Run one event through the machine and persist the outcome.
    ///
    /// Persistence is fire-and-forget: a failed write is logged and the
    /// in-memory session stays authoritative. The next dispatch rewrites the
    /// full snapshot, so a transient storage fault costs crash-durability
    /// for the affected step and nothing else.
    pub async fn dispatch(&mut self, event: SessionEvent) -> &Session {
        self.apply(event);
        self.persist().await;
        &self.state
    }

    fn apply(&mut self, event: SessionEvent) {
        self.state = transition(mem::take(&mut self.state), event);
    }

    async fn persist(&self) {
        let snapshot = match serde_json::to_string(&self.state) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to encode session snapshot");
                return;
            }
        };

        let entries = [
            (STATE_KEY, snapshot.as_str()),
            (USERNAME_KEY, self.state.username.as_str()),
        ];
        if let Err(err) = self.store.set_many(&entries).await {
            warn!(error = %err, "failed to persist session state");
        }
    }

    /// True when a question batch should be requested right now: the session
    /// is waiting for questions and no fetch is already running.
    #[must_use]
    pub fn should_fetch(&self) -> bool {
        self.state.awaiting_questions() && !self.fetch_in_flight
    }

    pub fn begin_fetch(&mut self) {
        self.fetch_in_flight = true;
    }

    pub fn finish_fetch(&mut self) {
        self.fetch_in_flight = false;
    }
}
