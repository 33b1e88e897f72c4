mod question;
mod session;

pub use question::{Question, RawQuestion};
pub use session::{INITIAL_TIMER_SECS, Session, SessionInvariantError};
