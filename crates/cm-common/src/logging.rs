//! Structured Logging Configuration
//!
//! - JSON output when `LOG_FORMAT=json`
//! - Human-readable output otherwise
//! - `RUST_LOG` wins over the configured default level
//!
//! Everything is written to stderr so command output on stdout stays
//! machine-readable.
//!
//! ```rust,ignore
//! cm_common::logging::init_logging("cm-admin", "warn");
//! tracing::info!(role_id = 3, "Saving rights");
//! ```

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize logging for the given service.
///
/// `default_level` is used when `RUST_LOG` is unset or unparseable.
pub fn init_logging(service_name: &str, default_level: &str) {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    let env_filter = build_filter(default_level);

    if log_format.eq_ignore_ascii_case("json") {
        init_json_logging(env_filter);
    } else {
        init_text_logging(env_filter);
    }

    tracing::debug!(service = service_name, "Logging initialized");
}

fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_json_logging(env_filter: EnvFilter) {
    // try_init: a second initialization (tests, embedding) is not fatal
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true)
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .flatten_event(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .try_init();
}

fn init_text_logging(env_filter: EnvFilter) {
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(true),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_default_level_falls_back() {
        // A garbage directive must not panic
        let filter = build_filter("not a [valid directive");
        drop(filter);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging("test", "debug");
        init_logging("test", "debug");
    }
}
