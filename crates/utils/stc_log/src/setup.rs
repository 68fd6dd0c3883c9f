//! Function to setup logging in binaries.

/// Crates that are too chatty on `info` and below.
const LOUD_CRATES: [&str; 2] = [
    // Logs every accepted connection on debug:
    "tiny_http",
    // Logs every parsed header on trace:
    "ascii",
];

/// The `RUST_LOG` filter we use when setting up logging.
///
/// Starts from `RUST_LOG` (or `info` if unset) and silences [`LOUD_CRATES`],
/// unless the user already mentions them explicitly.
pub fn default_log_filter() -> String {
    let mut rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned());

    for loud_crate in LOUD_CRATES {
        if !rust_log.contains(&format!("{loud_crate}=")) {
            rust_log.push_str(&format!(",{loud_crate}=warn"));
        }
    }

    rust_log
}

/// Directs [`log`] calls to stderr.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn setup_logging() {
    fn setup() {
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&default_log_filter());
        if builder.try_init().is_err() {
            crate::debug!("A logger was already installed");
        }
    }

    static START: std::sync::Once = std::sync::Once::new();
    START.call_once(setup);
}
