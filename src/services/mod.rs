//! Agent provider abstraction.
//!
//! The gateway treats the generating agent as an opaque collaborator behind
//! a trait so tests can swap the real CLI invocation for a mock.

pub mod agent;
pub mod mock;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use agent::CursorAgentProvider;
pub use mock::{MockAgentProvider, RecordedCall};

/// Error type for agent invocations.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to spawn agent command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("agent command failed: {status}")]
    NonZeroExit {
        status: std::process::ExitStatus,
        output: String,
    },

    #[error("agent command timed out after {timeout:?}")]
    TimedOut { timeout: Duration, output: String },

    #[error("failed to collect agent output: {0}")]
    Output(std::io::Error),
}

impl AgentError {
    /// Whatever the agent managed to emit before failing. Empty for spawn
    /// errors.
    pub fn output(&self) -> &str {
        match self {
            AgentError::NonZeroExit { output, .. } => output,
            AgentError::TimedOut { output, .. } => output,
            _ => "",
        }
    }
}

#[async_trait]
pub trait AgentProvider: Send + Sync {
    /// Run one generation, returning the agent's combined stdout/stderr
    /// untrimmed.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        api_key: Option<&str>,
    ) -> Result<String, AgentError>;
}
