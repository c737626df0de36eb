use cursor_gateway_service::config::{AgentConfig, GatewayConfig, ServerConfig};
use cursor_gateway_service::startup::Application;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    // Keeps the fake agent script alive for the lifetime of the test.
    agent_dir: TempDir,
}

impl TestApp {
    /// Spawn the gateway on a random port, backed by a fake agent shell
    /// script with the given body.
    pub async fn spawn(agent_script: &str) -> Self {
        let agent_dir = TempDir::new().expect("Failed to create temp dir");
        let agent_path = agent_dir.path().join("fake-agent");

        let mut file = std::fs::File::create(&agent_path).expect("Failed to create fake agent");
        writeln!(file, "#!/bin/sh\n{}", agent_script).expect("Failed to write fake agent");
        drop(file);
        std::fs::set_permissions(&agent_path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod fake agent");

        let config = GatewayConfig {
            server: ServerConfig { port: 0 },
            agent: AgentConfig {
                command: agent_path.to_string_lossy().into_owned(),
                timeout: Duration::from_secs(10),
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let address = format!("http://127.0.0.1:{}", port);

        // Wait for the server to accept connections by polling the health
        // endpoint.
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Self {
            address,
            port,
            agent_dir,
        }
    }

    /// Directory holding the fake agent script, usable for spawn markers.
    pub fn agent_dir(&self) -> &Path {
        self.agent_dir.path()
    }

    pub fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}", self.address, model)
    }
}
