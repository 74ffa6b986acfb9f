//! Error types shared across certify.
//!
//! `ProviderError` lives here rather than in `certify-providers` so the
//! generator can classify provider failures without string matching.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by the quiz engine itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// An answer refers to a question index outside the test.
    #[error("answer index {index} is out of range for a test of {len} question(s)")]
    InvalidAnswerIndex { index: usize, len: usize },

    /// A question record violates the record invariants.
    #[error("invalid question: {0}")]
    InvalidQuestion(String),

    /// The requested question count was zero.
    #[error("question count must be at least 1")]
    InvalidCount,

    /// The session was already submitted and can no longer change.
    #[error("test session has already been submitted")]
    AlreadySubmitted,

    /// Results were requested before the session was submitted.
    #[error("test session has not been submitted yet")]
    NotSubmitted,
}

/// Why LLM generation did not produce a usable test.
///
/// Every variant is recovered by falling back to the static question bank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No provider is configured.
    #[error("no LLM provider configured")]
    NoProvider,

    /// The provider call failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider refused the request in a way a retry cannot fix, such as
    /// a bad API key or an unknown model.
    #[error("provider rejected the request, check the provider configuration: {0}")]
    Rejected(String),

    /// The provider call did not finish in time.
    #[error("generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The response was not a JSON array.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The response parsed but no record passed validation.
    #[error("no valid questions in response ({rejected} rejected)")]
    NoValidQuestions { rejected: usize },
}

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid or missing API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }
}
