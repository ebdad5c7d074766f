//! Conversation state machine
//!
//! Pure transitions over a persisted [`Session`]: the runtime loads the
//! session, calls [`transition`], then carries out the returned effects.

mod effect;
pub mod input;
pub mod reply;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use input::UserInput;
pub use reply::Reply;
pub use state::{Session, SessionField, SessionState};
pub use transition::{transition, Rejection, TransitionResult};
