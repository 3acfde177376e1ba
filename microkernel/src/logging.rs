// Logging for the microkernel
//
// Thin layer over the `tracing` ecosystem. The kernel itself only emits
// events; installing a subscriber is left to the binary (or test) through
// one of the `init*` functions below.
//
// # Usage Examples
//
// ```rust
// use microkernel::logging;
//
// // INFO level, human-readable console output
// logging::init_default();
//
// // DEBUG for the kernel, TRACE for scheduling, with file/line info
// logging::init_development();
//
// // JSON lines for log collectors
// logging::init_production();
// ```
//
// Target filters follow the `RUST_LOG` syntax and are combined with the
// `RUST_LOG` environment variable:
//
// ```rust
// let config = logging::LogConfig {
//     target_filters: Some("microkernel::supervisor=debug".to_string()),
//     ..Default::default()
// };
// logging::init(config);
// ```

use std::sync::Once;
use tracing::{Level, Subscriber};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Configuration for kernel logging
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to use JSON format for logs
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id
    pub show_thread_info: bool,
    /// Whether to include timestamps
    pub show_time: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...")
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: true,
            show_thread_info: false,
            show_time: true,
            target_filters: None,
        }
    }
}

// Initialization guard to ensure we only initialize once
static INIT: Once = Once::new();

/// Builds the filter for `config`: the configured level, any `RUST_LOG`
/// directives, then the per-target filters.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env().add_directive(LevelFilter::from_level(config.level).into());

    if let Some(filters) = &config.target_filters {
        for directive in filters.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match directive.parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(err) => eprintln!("Ignoring invalid log filter '{}': {}", directive, err),
            }
        }
    }
    filter
}

/// Initialize the logging system with the given configuration
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(env_filter(&config));

        let fmt_layer = fmt::layer()
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line)
            .with_thread_names(config.show_thread_info)
            .with_thread_ids(config.show_thread_info);

        let subscriber: Box<dyn Subscriber + Send + Sync> = match (config.json_format, config.show_time) {
            (true, _) => Box::new(registry.with(fmt::layer().json().flatten_event(true))),
            (false, true) => Box::new(registry.with(fmt_layer)),
            (false, false) => Box::new(registry.with(fmt_layer.without_time())),
        };

        set_global_subscriber(subscriber);
    });
}

// Helper function to set the global subscriber
fn set_global_subscriber<S>(subscriber: S)
where
    S: Subscriber + Send + Sync + 'static,
{
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error setting global tracing subscriber: {}", err);
    }
}

/// INFO level, human-readable console output.
pub fn init_default() {
    init(LogConfig::default());
}

/// Initialize logging optimized for development
///
/// - DEBUG level for the kernel
/// - TRACE level for scheduling decisions
/// - Colorized console output with file/line information
pub fn init_development() {
    let config = LogConfig {
        level: Level::DEBUG,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
        show_time: true,
        target_filters: Some("microkernel=debug,microkernel::kernel::scheduler=trace".to_string()),
    };
    init(config);
}

/// Initialize logging optimized for production
///
/// JSON formatted output without file/line information.
pub fn init_production() {
    let config = LogConfig {
        level: Level::INFO,
        json_format: true,
        show_file_line: false,
        show_thread_info: false,
        show_time: true,
        target_filters: None,
    };
    init(config);
}

/// Initialize logging for testing
///
/// Only warnings and errors, no timestamps, to keep test output compact.
///
/// ```rust
/// #[test]
/// fn my_test() {
///     microkernel::logging::init_test();
///     // ...
/// }
/// ```
pub fn init_test() {
    let config = LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
        show_time: false,
        target_filters: None,
    };
    init(config);
}

/// Span covering the execution of one actor's behavior.
///
/// ```ignore
/// let _guard = microkernel::actor_span!(actor_id).entered();
/// ```
#[macro_export]
macro_rules! actor_span {
    ($actor_id:expr) => {
        $crate::logging::trace_span!("actor", id = %$actor_id)
    };
    ($actor_id:expr, $($fields:tt)*) => {
        $crate::logging::trace_span!("actor", id = %$actor_id, $($fields)*)
    };
}

/// Log actor lifecycle events (spawn, stop, reclamation, child starts)
///
/// ```ignore
/// log_lifecycle!(actor_id, "spawned");
/// log_lifecycle!(actor_id, "reclaimed", reason = %reason);
/// ```
#[macro_export]
macro_rules! log_lifecycle {
    ($actor_id:expr, $event:expr) => {
        $crate::logging::debug!(actor = %$actor_id, event = $event)
    };
    ($actor_id:expr, $event:expr, $($fields:tt)*) => {
        $crate::logging::debug!(actor = %$actor_id, event = $event, $($fields)*)
    };
}

/// Log scheduling events
///
/// ```ignore
/// log_scheduler!("ready_queue", "enqueued", ready = 3);
/// ```
#[macro_export]
macro_rules! log_scheduler {
    ($scheduler:expr, $event:expr) => {
        $crate::logging::trace!(scheduler = $scheduler, event = $event)
    };
    ($scheduler:expr, $event:expr, $($fields:tt)*) => {
        $crate::logging::trace!(scheduler = $scheduler, event = $event, $($fields)*)
    };
}

/// Log runtime-wide events
///
/// ```ignore
/// log_system!("run", "started", actors = 4);
/// ```
#[macro_export]
macro_rules! log_system {
    ($operation:expr, $status:expr) => {
        $crate::logging::info!(operation = $operation, status = $status)
    };
    ($operation:expr, $status:expr, $($fields:tt)*) => {
        $crate::logging::info!(operation = $operation, status = $status, $($fields)*)
    };
}

/// Log error events
///
/// ```ignore
/// log_error!(err, operation = "poll");
/// ```
#[macro_export]
macro_rules! log_error {
    ($error:expr) => {
        $crate::logging::error!(error = %$error)
    };
    ($error:expr, $($fields:tt)*) => {
        $crate::logging::error!(error = %$error, $($fields)*)
    };
}

// Re-export the most commonly used tracing macros for convenience
pub use tracing::{debug, error, info, trace, trace_span, warn};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.json_format);
        assert!(config.target_filters.is_none());
    }

    #[test]
    fn test_init_is_idempotent() {
        init_test();
        init_test();
        init_development();
        crate::log_system!("logging_test", "completed");
    }
}
