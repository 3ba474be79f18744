use thiserror::Error;

use crate::transcript::Turn;

/// Failure of a single model query. The runner converts any of these into
/// one failed trial; they never abort the surrounding loop.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("model endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed model response: {0}")]
    BadResponse(String),
}

/// Seam between the runner and the model endpoint. The question is
/// appended to `context` as a final synthesized user turn by the
/// implementation; the context turns themselves go over verbatim.
pub trait ModelQuery {
    fn query(&self, context: &[Turn], question: &str) -> Result<String, QueryError>;
}
