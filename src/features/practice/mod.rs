//! Practice history.
//!
//! Every run of an exercise is recorded as a session so the user can look
//! back at what they practiced.

pub mod session;
pub mod storage;

pub use session::{PracticeSession, SessionState};
pub use storage::{PracticeStorage, PracticeTotals};
