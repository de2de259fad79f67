//! Study sessions
//!
//! - `phase`: the pure phase machine (learning, break, practice, finished)
//! - `controller`: runs the machine against storage, sound and the clock
//! - `driver`: puts a controller on a tokio task with its timers

mod controller;
mod driver;
mod phase;

pub use controller::{SessionError, SessionRequest, SessionServices, SessionSummary, StudySession};
pub use driver::{spawn_session, SessionCommand, SessionHandle, SessionSnapshot};
pub use phase::{
    reduce, BreakKind, Effect, PendingEntry, ReduceContext, SessionEvent, SessionPhase, Transition,
};
