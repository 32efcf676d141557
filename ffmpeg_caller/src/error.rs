use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallerError {
    /// A line reached the output state machine before an invocation started.
    #[error("internal error: output state must be initialized before handling lines")]
    Uninitialized,
    #[error("failed to spawn `{binary}`")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },
    #[error("spawned process has no piped stderr")]
    MissingStderr,
    #[error(transparent)]
    Io(#[from] io::Error),
}
