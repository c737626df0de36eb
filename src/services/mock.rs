//! Mock agent provider for testing.

use super::{AgentError, AgentProvider};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded invocation of the mock.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub api_key: Option<String>,
}

/// Mock agent provider returning a canned reply and recording every call.
pub struct MockAgentProvider {
    reply: Result<String, MockFailure>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

#[derive(Debug, Clone)]
enum MockFailure {
    NonZeroExit { output: String },
    TimedOut,
}

impl MockAgentProvider {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A mock that fails every call as a non-zero exit with the given
    /// captured output.
    pub fn failing(output: impl Into<String>) -> Self {
        Self {
            reply: Err(MockFailure::NonZeroExit {
                output: output.into(),
            }),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A mock that times out every call.
    pub fn timing_out() -> Self {
        Self {
            reply: Err(MockFailure::TimedOut),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }

    /// Handle onto the call log, usable after the provider moved into state.
    pub fn call_log(&self) -> Arc<Mutex<Vec<RecordedCall>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl AgentProvider for MockAgentProvider {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        api_key: Option<&str>,
    ) -> Result<String, AgentError> {
        self.calls
            .lock()
            .expect("mock call log poisoned")
            .push(RecordedCall {
                model: model.to_string(),
                prompt: prompt.to_string(),
                api_key: api_key.map(str::to_string),
            });

        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(MockFailure::NonZeroExit { output }) => {
                use std::os::unix::process::ExitStatusExt;
                Err(AgentError::NonZeroExit {
                    // Raw wait status 0x100 = exited with code 1.
                    status: std::process::ExitStatus::from_raw(256),
                    output: output.clone(),
                })
            }
            Err(MockFailure::TimedOut) => Err(AgentError::TimedOut {
                timeout: Duration::from_secs(180),
                output: String::new(),
            }),
        }
    }
}
