//! Scriptable LLM port for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::error::LlmError;
use super::external::{LlmPort, LlmRequest, LlmResponse};

type Script = Box<dyn Fn(&LlmRequest, usize) -> Result<String, LlmError> + Send + Sync>;

/// LLM stub whose reply is computed from the request and the zero-based call index.
///
/// Every request is recorded so tests can assert on prompt contents.
pub struct ScriptedLlm {
    script: Script,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn from_fn(
        script: impl Fn(&LlmRequest, usize) -> Result<String, LlmError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always reply with the same text.
    pub fn always(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::from_fn(move |_, _| Ok(reply.clone()))
    }

    /// Always fail with the given error.
    pub fn failing(error: LlmError) -> Self {
        Self::from_fn(move |_, _| Err(error.clone()))
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().expect("lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("lock").len()
    }
}

#[async_trait]
impl LlmPort for ScriptedLlm {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let call = {
            let mut requests = self.requests.lock().expect("lock");
            requests.push(request.clone());
            requests.len() - 1
        };
        (self.script)(&request, call).map(LlmResponse::text)
    }
}
