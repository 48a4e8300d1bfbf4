#![forbid(unsafe_code)]

//! Logging support.
//!
//! With the `tracing` feature the usual `tracing` macros are re-exported at
//! the crate root, so layer code logs through `crate::debug!` and friends.
//! Without it the same names expand to `()`, so they work both as statements
//! and as match arm expressions, and the core carries no hard logging
//! dependency for hosts that do not want one.

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

// When tracing is not enabled, provide no-op macros
#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {
            ()
        };
    }

    /// No-op error macro when tracing is disabled.
    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {
            ()
        };
    }

    /// No-op info macro when tracing is disabled.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {
            ()
        };
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {
            ()
        };
    }

    /// No-op warn macro when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {
            ()
        };
    }
}
