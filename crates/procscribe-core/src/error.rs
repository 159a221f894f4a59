use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterviewError {
    #[error("State error: {0}")]
    State(#[from] procscribe_state::StateError),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("Failed to write document {path}: {source}")]
    WriteDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Interview was interrupted")]
    Interrupted,
}
