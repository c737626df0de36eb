//! Cursor agent CLI provider.

use super::{AgentError, AgentProvider};
use crate::config::AgentConfig;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Bounded wait for pipe EOF after the child is gone. An orphaned
/// grandchild can keep the pipes open indefinitely, so the drain tasks are
/// detached once the grace expires; anything already read stays in the
/// shared buffers.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Runs `<command> chat --model <model>` once per call, feeding the prompt
/// through standard input to stay clear of argv length limits.
pub struct CursorAgentProvider {
    config: AgentConfig,
}

impl CursorAgentProvider {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AgentProvider for CursorAgentProvider {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        api_key: Option<&str>,
    ) -> Result<String, AgentError> {
        let mut command = Command::new(&self.config.command);
        command
            .arg("chat")
            .arg("--model")
            .arg(model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The child must not outlive a cancelled request or a fired
            // deadline; dropping the wait future reaps it.
            .kill_on_drop(true);

        // Child environment is the inherited parent environment plus the
        // per-request credential override. Nothing shared is mutated.
        if let Some(key) = api_key {
            command.env("CURSOR_API_KEY", key);
        }

        tracing::debug!(
            command = %self.config.command,
            model = %model,
            "Executing agent command"
        );

        let mut child = command.spawn().map_err(|source| AgentError::Spawn {
            command: self.config.command.clone(),
            source,
        })?;

        // Write the prompt concurrently so an agent that emits output before
        // draining stdin cannot deadlock against full pipe buffers.
        if let Some(mut stdin) = child.stdin.take() {
            let prompt = prompt.to_owned();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                    tracing::debug!("Failed to write prompt to agent stdin: {}", e);
                }
                // stdin drops here, closing the pipe.
            });
        }

        // Drain stdout/stderr into shared buffers as the agent runs, so a
        // fired deadline can still report whatever was captured up to the
        // kill.
        let stdout_buf = Arc::new(Mutex::new(Vec::new()));
        let stderr_buf = Arc::new(Mutex::new(Vec::new()));
        let stdout_task = child
            .stdout
            .take()
            .map(|pipe| tokio::spawn(drain(pipe, Arc::clone(&stdout_buf))));
        let stderr_task = child
            .stderr
            .take()
            .map(|pipe| tokio::spawn(drain(pipe, Arc::clone(&stderr_buf))));

        let status = match tokio::time::timeout(self.config.timeout, child.wait()).await {
            Ok(waited) => waited.map_err(AgentError::Output)?,
            Err(_) => {
                child.kill().await.ok();
                settle(stdout_task).await;
                settle(stderr_task).await;
                return Err(AgentError::TimedOut {
                    timeout: self.config.timeout,
                    output: combined_output(&stdout_buf, &stderr_buf),
                });
            }
        };

        settle(stdout_task).await;
        settle(stderr_task).await;
        let combined = combined_output(&stdout_buf, &stderr_buf);

        if !status.success() {
            return Err(AgentError::NonZeroExit {
                status,
                output: combined,
            });
        }

        Ok(combined)
    }
}

async fn settle(task: Option<JoinHandle<()>>) {
    if let Some(task) = task {
        // On grace expiry the handle is dropped; the task finishes (or not)
        // in the background without blocking the request.
        tokio::time::timeout(DRAIN_GRACE, task).await.ok();
    }
}

/// Append everything the pipe produces to the shared buffer, chunk by chunk,
/// until EOF.
async fn drain(mut pipe: impl AsyncRead + Unpin, buffer: Arc<Mutex<Vec<u8>>>) {
    let mut chunk = [0u8; 4096];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(&chunk[..n]),
        }
    }
}

fn combined_output(stdout: &Mutex<Vec<u8>>, stderr: &Mutex<Vec<u8>>) -> String {
    let mut bytes = stdout.lock().unwrap_or_else(PoisonError::into_inner).clone();
    bytes.extend_from_slice(&stderr.lock().unwrap_or_else(PoisonError::into_inner));
    String::from_utf8_lossy(&bytes).into_owned()
}
