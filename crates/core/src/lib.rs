#![forbid(unsafe_code)]

pub mod machine;
pub mod model;

pub use machine::{SessionEvent, transition};
pub use model::{INITIAL_TIMER_SECS, Question, RawQuestion, Session, SessionInvariantError};
