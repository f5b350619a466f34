//! Logger module for Acorn
//!
//! Go-style simple logging: `[LEVEL] message`
//!
//! # Usage
//!
//! ```rust
//! use acorn::util::logger;
//!
//! logger::init();
//! tracing::info!("Translating {}", "main.oak");
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl LogLevel {
    /// Pick a level from the CLI verbosity switches
    pub fn from_flags(
        verbose: bool,
        debug: bool,
    ) -> Self {
        if debug {
            LogLevel::Debug
        } else if verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        }
    }
}

/// Initialize logger with default configuration (WARN level)
pub fn init() {
    init_with_level(LogLevel::Warn);
}

/// Initialize logger with custom level (Go style: `[LEVEL] message`)
///
/// Calling this twice is harmless; the second subscriber is discarded.
pub fn init_with_level(level: LogLevel) {
    let filter = tracing_subscriber::filter::LevelFilter::from_level(level.into());

    // Go style: `[LEVEL]` prefix, no time, no module path, no colors
    let layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_filter(filter);

    let _ = Registry::default().with(layer).try_init();
}

/// Initialize logger for debug use (DEBUG level)
pub fn init_debug() {
    init_with_level(LogLevel::Debug);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_flags() {
        assert_eq!(LogLevel::from_flags(false, false), LogLevel::Warn);
        assert_eq!(LogLevel::from_flags(true, false), LogLevel::Info);
        assert_eq!(LogLevel::from_flags(true, true), LogLevel::Debug);
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(tracing::Level::from(LogLevel::Error), tracing::Level::ERROR);
        assert_eq!(tracing::Level::from(LogLevel::Debug), tracing::Level::DEBUG);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_debug();
        init();
    }
}
