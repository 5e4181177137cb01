use thiserror::Error;

/// The single failure kind surfaced by a game lookup. Callers treat it as
/// "not found" for the candidate in question.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned status {status}")]
    Status { status: u16 },

    #[error("request still queued after retries")]
    Queued,

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("game {0} not present in response")]
    Missing(u64),
}

impl LookupError {
    /// Worth another attempt after a pause.
    pub fn is_transient(&self) -> bool {
        match self {
            LookupError::Transport(_) | LookupError::Queued => true,
            LookupError::Status { status } => *status == 429 || *status >= 500,
            LookupError::Parse(_) | LookupError::Missing(_) => false,
        }
    }
}
