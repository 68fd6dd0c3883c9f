//! The `stc_server` binary.

use std::sync::Arc;

use clap::Parser as _;

use stc_engine::{DatasetSnapshot, GlobalMapsCache, InMemorySource, TimestampSource};
use stc_server::{AdaptiveMapsServer, FileTimestampSource, ServerArgs, routes};

fn main() -> anyhow::Result<()> {
    stc_log::setup_logging();

    let args = ServerArgs::parse();

    let source: Arc<dyn TimestampSource> = match &args.timestamps {
        Some(path) => Arc::new(FileTimestampSource::new(path)),
        None => {
            stc_log::warn!("No --timestamps file given, serving an empty dataset");
            Arc::new(InMemorySource(DatasetSnapshot::new(Vec::<f64>::new())))
        }
    };

    let cache = Arc::new(GlobalMapsCache::new(source));
    let server = AdaptiveMapsServer::new(&args.bind, args.port, cache, args.default_config())?;

    stc_log::info!(
        "Serving global adaptive maps at {}{}",
        server.server_url(),
        routes::GLOBAL_MAPS_PATH
    );

    server.block();
    Ok(())
}
