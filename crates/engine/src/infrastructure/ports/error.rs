//! Error types for port operations.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageGenError {
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    #[error("Service unavailable")]
    Unavailable,
}
