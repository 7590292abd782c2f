#![deny(missing_docs)]
//! Shared logging utilities for the harvester workspace.
//!
//! This crate provides the `harvest_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every message emitted
//! through the macros is tagged with the harvest round the current thread is in.

use std::cell::Cell;

#[doc(hidden)]
pub use log as __log;

thread_local! {
    /// Thread-local storage for the current harvest round.
    static ROUND: Cell<u64> = const { Cell::new(0) };
}

/// Sets the harvest round for the current thread.
/// The harvest loop calls this once at the start of every round.
pub fn set_round(round: u64) {
    ROUND.with(|v| v.set(round));
}

/// Retrieves the harvest round for the current thread.
/// Returns 0 before the first round has started.
pub fn current_round() -> u64 {
    ROUND.with(|v| v.get())
}

/// Logs a trace-level message tagged with the current round.
#[macro_export]
macro_rules! harvest_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("[round {}] {}", $crate::current_round(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current round.
#[macro_export]
macro_rules! harvest_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("[round {}] {}", $crate::current_round(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current round.
#[macro_export]
macro_rules! harvest_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("[round {}] {}", $crate::current_round(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current round.
#[macro_export]
macro_rules! harvest_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("[round {}] {}", $crate::current_round(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current round.
#[macro_export]
macro_rules! harvest_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("[round {}] {}", $crate::current_round(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
