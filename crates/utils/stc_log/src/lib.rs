//! Text logging (nothing to do with profiling) for the space-time cube crates.
//!
//! * `trace`: spammy things
//! * `debug`: things that might be useful when debugging
//! * `info`: things that we want to show to users
//! * `warn`: problems that we can recover from
//! * `error`: problems that lead to loss of functionality or data
//!
//! The `warn_once` etc macros are for when you want to suppress repeated
//! logging of the exact same message.

mod debug_assert;
mod result_extensions;

#[cfg(not(target_arch = "wasm32"))]
mod setup;

pub use log::{Level, LevelFilter, debug, error, info, log_enabled, trace, warn};

pub use log_once::{debug_once, error_once, info_once, log_once, trace_once, warn_once};

pub use self::result_extensions::ResultExt;

#[cfg(not(target_arch = "wasm32"))]
pub use self::setup::{default_log_filter, setup_logging};

/// Re-exports of other crates.
pub mod external {
    pub use log;
}
