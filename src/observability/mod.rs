//! Process-wide logging setup, executed once before serving.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` always wins. Without it, the default level is `default_level`
/// inside Kubernetes and `debug` everywhere else, so local runs are verbose
/// without extra flags.
pub fn init_tracing(default_level: &str) {
    let in_kubernetes = std::env::var_os("KUBERNETES_SERVICE_HOST").is_some();
    let fallback = if in_kubernetes { default_level } else { "debug" };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true),
        )
        .init();
}
