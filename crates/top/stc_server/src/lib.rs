//! Serves the dataset-wide adaptive time maps as JSON.
//!
//! See [`routes`] for the endpoints.

mod args;
pub mod routes;
mod source;

use std::str::FromStr as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use stc_density::EngineConfig;
use stc_engine::{CacheError, GlobalMapsCache};
use stc_log::ResultExt as _;

pub use self::args::ServerArgs;
pub use self::source::{FileTimestampSource, parse_timestamps};

pub const DEFAULT_SERVER_PORT: u16 = 9877;

/// Failure to host the adaptive maps.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("Could not parse address: {0}")]
    AddrParseFailed(#[from] std::net::AddrParseError),

    #[error("Failed to create server at address {0}: {1}")]
    CreateServerFailed(String, Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize response: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// HTTP host for the global adaptive maps.
///
/// Listens as soon as it is created, and stops when dropped.
#[must_use = "Dropping this means stopping the server"]
pub struct AdaptiveMapsServer {
    inner: Arc<ServerInner>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
}

struct ServerInner {
    server: tiny_http::Server,
    shutdown: AtomicBool,
    num_requests: AtomicU64,
    cache: Arc<GlobalMapsCache>,

    /// Used for query parameters the client leaves out.
    defaults: EngineConfig,
}

impl AdaptiveMapsServer {
    /// Port `0` lets the OS pick a free port, see [`Self::server_url`].
    pub fn new(
        bind_ip: &str,
        port: u16,
        cache: Arc<GlobalMapsCache>,
        defaults: EngineConfig,
    ) -> Result<Self, ServerError> {
        let bind_addr = std::net::SocketAddr::new(bind_ip.parse()?, port);

        let server = tiny_http::Server::http(bind_addr)
            .map_err(|err| ServerError::CreateServerFailed(bind_addr.to_string(), err))?;

        let inner = Arc::new(ServerInner {
            server,
            shutdown: AtomicBool::new(false),
            num_requests: AtomicU64::new(0),
            cache,
            defaults: EngineConfig::clamped(defaults.bin_count, defaults.kernel_width),
        });

        let thread_handle = std::thread::Builder::new()
            .name("stc_server".to_owned())
            .spawn({
                let inner = Arc::clone(&inner);
                move || inner.serve()
            })?;

        Ok(Self {
            inner,
            thread_handle: Some(thread_handle),
        })
    }

    /// Includes `http://` prefix
    pub fn server_url(&self) -> String {
        let local_addr = self.inner.server.server_addr();
        if let Some(local_addr) = local_addr.clone().to_ip()
            && local_addr.ip().is_unspecified()
        {
            return format!("http://127.0.0.1:{}", local_addr.port());
        }
        format!("http://{local_addr}")
    }

    /// Blocks execution as long as the server is running.
    pub fn block(mut self) {
        if let Some(thread_handle) = self.thread_handle.take() {
            thread_handle.join().ok();
        }
    }
}

impl Drop for AdaptiveMapsServer {
    fn drop(&mut self) {
        if let Some(thread_handle) = self.thread_handle.take() {
            let num_requests = self.inner.num_requests.load(Ordering::Relaxed);
            stc_log::debug!("Shutting down adaptive maps server after {num_requests} request(s)");

            self.inner.shutdown.store(true, Ordering::Release);
            self.inner.server.unblock();
            thread_handle.join().ok();
        }
    }
}

impl ServerInner {
    fn serve(&self) {
        loop {
            let request = self.server.recv();
            if self.shutdown.load(Ordering::Acquire) {
                return;
            }

            let Some(request) = request.ok_or_log_error() else {
                continue;
            };

            self.num_requests.fetch_add(1, Ordering::Relaxed);

            self.send_response(request)
                .warn_on_err_once("Failed to send http response");
        }
    }

    fn send_response(&self, request: tiny_http::Request) -> Result<(), std::io::Error> {
        let reply = routes::handle(
            &self.cache,
            self.defaults,
            request.method().as_str(),
            request.url(),
        );

        let mut response =
            tiny_http::Response::from_data(reply.body).with_status_code(reply.status);

        let headers = std::iter::once(format!("Content-Type: {}", reply.content_type)).chain(
            reply
                .cache_control
                .map(|value| format!("Cache-Control: {value}")),
        );
        for header in headers {
            match tiny_http::Header::from_str(&header) {
                Ok(header) => response.add_header(header),
                Err(()) => stc_log::warn_once!("Invalid http header: {header:?}"),
            }
        }

        request.respond(response)
    }
}
