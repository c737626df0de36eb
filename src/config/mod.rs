use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;
use std::time::Duration;

const DEFAULT_AGENT_COMMAND: &str = "cursor-agent";

/// Ceiling on a single agent invocation (3 minutes).
const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    1994
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Agent executable, resolved through PATH unless absolute.
    pub command: String,
    /// Deadline for one subprocess run, measured from request handling.
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let server = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        let command =
            env::var("CURSOR_AGENT_CMD").unwrap_or_else(|_| DEFAULT_AGENT_COMMAND.to_string());

        let timeout_secs = match env::var("CURSOR_AGENT_TIMEOUT_SECS") {
            Ok(val) => val.parse().map_err(|_| {
                AppError::ConfigError(anyhow::anyhow!(
                    "CURSOR_AGENT_TIMEOUT_SECS must be an integer number of seconds, got {:?}",
                    val
                ))
            })?,
            Err(_) => DEFAULT_AGENT_TIMEOUT_SECS,
        };

        Ok(GatewayConfig {
            server,
            agent: AgentConfig {
                command,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}
