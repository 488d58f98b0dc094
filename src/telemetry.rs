//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogConfig, RunMode};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Release mode emits JSON lines.
pub fn init_tracing(log: &LogConfig, mode: RunMode) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&log.level)));

    let registry = tracing_subscriber::registry().with(env_filter);
    match mode {
        RunMode::Release => registry.with(fmt::layer().json()).init(),
        RunMode::Debug | RunMode::Test => registry.with(fmt::layer()).init(),
    }
}

fn default_directives(level: &str) -> String {
    format!("{level},tower_http=info,sqlx=warn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        let directives = default_directives("debug");
        assert!(directives.starts_with("debug,"));
        assert!(EnvFilter::try_new(directives).is_ok());
    }
}
