use tracing_subscriber::{EnvFilter, fmt};

use crate::domain::common::Environment;

/// Installs the global subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_logging(env: Environment, default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match env {
        Environment::Production => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .init(),
        Environment::Development | Environment::Test => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}
