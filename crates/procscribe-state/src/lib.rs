mod aspect;
mod state;

pub use aspect::Aspect;
pub use state::{InterviewState, Interaction, StateError, StateStats, DEFAULT_RECENT_WINDOW};
