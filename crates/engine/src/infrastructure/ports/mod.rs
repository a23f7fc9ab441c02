//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions over the outside world. Ports exist for:
//! - Text generation (could swap OpenAI -> Ollama/Claude)
//! - Image generation (could swap Holara -> other)

mod error;
mod external;

#[cfg(test)]
mod testing;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    ChatMessage, FinishReason, ImageGenPort, ImageRequest, ImageResult, LlmPort, LlmRequest,
    LlmResponse, MessageRole, TokenUsage,
};

// =============================================================================
// Test-Only Doubles (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use external::MockImageGenPort;

#[cfg(test)]
pub use testing::ScriptedLlm;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{ImageGenError, LlmError};
