//! Logging macros for the scheduler with verbosity level control.
//!
//! Events go through `tracing`; the verbosity gate keeps the passes quiet
//! unless the caller asks for detail, whatever subscriber is installed.
//! Verbosity levels:
//! - 0: SILENT (only warnings and errors)
//! - 1: CHANGES (per-recipe results, relaxed starts, fallback ordering)
//! - 2: CHECKS (dropped references, overlap guard decisions)
//! - 3: DEBUG (per-step timings of every pass)

/// Verbosity level constants.
pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1).
///
/// Used for: recipe totals, relaxed start times, degraded ordering.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            ::tracing::info!($($arg)*);
        }
    };
}

/// Log at CHECKS level (verbosity >= 2).
///
/// Used for: dropped references, overlap pairs rejected by the guard.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            ::tracing::debug!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
///
/// Used for: forward and backward pass internals.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            ::tracing::trace!($($arg)*);
        }
    };
}

/// Map a verbosity level to the `tracing` filter directive the CLI falls back
/// to when `RUST_LOG` is unset.
pub fn filter_directive(verbosity: u8) -> &'static str {
    match verbosity {
        VERBOSITY_SILENT => "warn",
        VERBOSITY_CHANGES => "info",
        VERBOSITY_CHECKS => "debug",
        _ => "trace",
    }
}
