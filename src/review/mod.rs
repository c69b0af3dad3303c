//! History review: session index, screen state machine and its async driver.

mod index;
mod screen;
mod state;

pub use index::{ExpandedSession, SessionIndex};
pub use screen::ReviewScreen;
pub use state::*;
