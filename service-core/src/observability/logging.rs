use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Initialize the global tracing subscriber.
///
/// Calling this more than once is a no-op: the subscriber is installed
/// exactly once per process, so library consumers and tests can call it
/// without coordinating on init order.
pub fn init_tracing(service_name: &str, log_level: &str) {
    INIT.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

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

        tracing::info!(service = %service_name, "Tracing initialized");
    });
}
