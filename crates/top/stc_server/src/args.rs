use std::path::PathBuf;

use stc_density::{DEFAULT_BIN_COUNT, DEFAULT_KERNEL_WIDTH, EngineConfig};

use crate::DEFAULT_SERVER_PORT;

/// Serve the dataset-wide adaptive time maps over HTTP.
#[derive(Debug, Clone, clap::Parser)]
#[clap(author, version, about)]
pub struct ServerArgs {
    /// What IP to bind to.
    #[clap(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// What port to listen on. `0` lets the OS pick one.
    #[clap(long, default_value_t = DEFAULT_SERVER_PORT)]
    pub port: u16,

    /// File with the dataset timestamps, separated by commas, whitespace or newlines.
    ///
    /// Millisecond epoch values are converted to seconds.
    /// Without it, an empty dataset is served.
    #[clap(long)]
    pub timestamps: Option<PathBuf>,

    /// Bin count used when a request has no `binCount`.
    #[clap(long, default_value_t = DEFAULT_BIN_COUNT)]
    pub bin_count: usize,

    /// Kernel width used when a request has no `kernelWidth`.
    #[clap(long, default_value_t = DEFAULT_KERNEL_WIDTH)]
    pub kernel_width: usize,
}

impl ServerArgs {
    /// The resolution used for missing query parameters, clamped to the accepted ranges.
    pub fn default_config(&self) -> EngineConfig {
        EngineConfig::clamped(self.bin_count, self.kernel_width)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::*;

    #[test]
    fn defaults() {
        let args = ServerArgs::parse_from(["stc_server"]);
        assert_eq!(args.bind, "0.0.0.0");
        assert_eq!(args.port, DEFAULT_SERVER_PORT);
        assert_eq!(args.timestamps, None);
        assert_eq!(args.default_config(), EngineConfig::default());
    }

    #[test]
    fn overrides() {
        let args = ServerArgs::parse_from([
            "stc_server",
            "--port",
            "0",
            "--timestamps",
            "events.csv",
            "--bin-count",
            "10",
            "--kernel-width",
            "3",
        ]);
        assert_eq!(args.port, 0);
        assert_eq!(args.timestamps, Some(PathBuf::from("events.csv")));
        assert_eq!(args.default_config(), EngineConfig::new(64, 3));
    }
}
