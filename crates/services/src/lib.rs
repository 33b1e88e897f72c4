#![forbid(unsafe_code)]

pub mod driver;
pub mod error;
pub mod format;
pub mod provider;
pub mod runtime;

pub use quiz_core::machine::{SessionEvent, transition};
pub use quiz_core::model::Session;

pub use error::{DriverError, ProviderError, RuntimeError, SnapshotError};

pub use driver::{STATE_KEY, USERNAME_KEY, SessionDriver, decode_snapshot};
pub use format::format_questions;
pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_QUESTION_COUNT, OpenTdbClient, ProviderConfig, QuestionSource,
};
pub use runtime::{QuizRuntime, RuntimeHandle};
