//! Structured logging setup
//!
//! Initializes the `tracing` subscriber used by the binary. Library code only
//! emits events through the `tracing` macros and never installs a subscriber
//! itself.
//!
//! # Features
//!
//! - Console output with pretty formatting (default)
//! - Optional JSON output for pipeline log collectors
//! - `RUST_LOG` takes precedence over the configured level
//! - Can only be initialized once per process
//!
//! # Example
//!
//! ```no_run
//! use build_system_cnb::util::logging;
//!
//! logging::init_logging(logging::LoggingConfig::from_env());
//!
//! use tracing::{info, warn};
//! info!(build_system = "maven", "Starting build");
//! warn!("No home directory configured");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "BUILD_SYSTEM_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "BUILD_SYSTEM_LOG_JSON";

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., build_system_cnb::runner) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Reads `BUILD_SYSTEM_LOG_LEVEL` and `BUILD_SYSTEM_LOG_JSON`
    pub fn from_env() -> Self {
        config_from_lookup(|key| env::var(key).ok())
    }
}

/// Parses a log level from a string
///
/// Unknown values fall back to `Level::INFO`.
///
/// ```
/// use build_system_cnb::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("INFO"), Level::INFO);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber. Subsequent calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!("build_system_cnb={}", config.level))
        };

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}

fn config_from_lookup<F>(lookup: F) -> LoggingConfig
where
    F: Fn(&str) -> Option<String>,
{
    let level = parse_level(&lookup(LOG_LEVEL_ENV).unwrap_or_else(|| "info".to_string()));
    let use_json = lookup(LOG_JSON_ENV)
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    // pipeline log collectors get source locations along with JSON
    LoggingConfig {
        level,
        use_json,
        include_location: use_json,
        ..Default::default()
    }
}
