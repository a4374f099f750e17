//! Reward Session -- one video-watch lifecycle.
//!
//! The state machine itself ([`session::RewardSession`]) is pure and
//! tick-driven so the completion invariants are testable without a clock.
//! [`runner::SessionRunner`] owns the 1-second interval, the 5-second
//! celebration window, and the completion/back hooks, and guarantees the
//! tick source is released on every exit path.

pub mod resolver;
pub mod runner;
pub mod session;

pub use resolver::resolve_embed_id;
pub use runner::{SessionHooks, SessionRunner, SessionSnapshot};
pub use session::{Completion, RewardSession, SessionError, SessionState};
