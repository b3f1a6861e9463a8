use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::{ContactbookError, ContactbookResult, err, error::ErrorKind};

use super::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService,
    HttpStatusCode,
};
use super::traits::Pal;

/// How long the accept loop waits for a connection before re-checking the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/* 📖 # Why tiny_http with a thread per request?

tiny_http is a small synchronous HTTP server. The accept loop runs on its own thread and
hands every request to a fresh thread, so one slow request never blocks another and no
async runtime is needed. Requests share nothing except the service itself.
*/

/// Concrete PAL implementation using the real filesystem and tiny_http.
///
/// All relative file paths are resolved against a configured base directory.
#[derive(Debug)]
pub struct RealPal {
    base_dir: PathBuf,
}

impl RealPal {
    /// Create a new RealPal with the given base directory.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Resolve a path against the base directory. Absolute paths are kept as they are.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    fn file_error(path: PathBuf, source: std::io::Error) -> Box<ContactbookError> {
        Box::new(ContactbookError::new(ErrorKind::FileError { path, source }))
    }
}

impl Pal for RealPal {
    #[instrument(skip(self), fields(path = %path.display()))]
    fn file_exists(&self, path: &Path) -> ContactbookResult<bool> {
        let resolved = self.resolve_path(path);
        let exists = resolved.is_file();
        debug!(exists, resolved = %resolved.display(), "checked file existence");
        Ok(exists)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn read_file_to_string(&self, path: &Path) -> ContactbookResult<String> {
        let resolved = self.resolve_path(path);
        fs::read_to_string(&resolved).map_err(|e| {
            debug!(error = %e, "failed to read file");
            Self::file_error(resolved, e)
        })
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn create_directory_all(&self, path: &Path) -> ContactbookResult<()> {
        let resolved = self.resolve_path(path);
        fs::create_dir_all(&resolved).map_err(|e| {
            debug!(error = %e, "failed to create directory");
            Self::file_error(resolved, e)
        })
    }

    #[instrument(skip(self, service), fields(address = %config.address()))]
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> ContactbookResult<HttpServerHandle> {
        let address = config.address();
        let server = tiny_http::Server::http(address.as_str())
            .map_err(|e| err!("Failed to bind HTTP server to {}: {}", address, e))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| err!("HTTP server on {} is not bound to an IP address", address))?;

        let service: Arc<dyn HttpService> = Arc::from(service);
        let handle = HttpServerHandle::new(port);
        let shutdown = Arc::clone(handle.shutdown_flag());
        let config = Arc::new(config);

        let worker = thread::Builder::new()
            .name(format!("http-accept-{}", port))
            .spawn(move || {
                while !shutdown.load(Ordering::SeqCst) {
                    match server.recv_timeout(ACCEPT_POLL_INTERVAL) {
                        Ok(Some(request)) => {
                            let service = Arc::clone(&service);
                            let config = Arc::clone(&config);
                            let spawned = thread::Builder::new()
                                .name("http-request".to_string())
                                .spawn(move || serve_request(service.as_ref(), request, &config));
                            if let Err(e) = spawned {
                                error!(error = %e, "failed to spawn request thread");
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            error!(error = %e, "HTTP server stopped accepting connections");
                            break;
                        }
                    }
                }
                info!(port, "HTTP server shut down");
            })
            .map_err(|e| err!("Failed to spawn HTTP accept thread: {}", e))?;

        info!(port, "HTTP server listening");
        Ok(handle.with_worker(worker))
    }
}

fn serve_request(
    service: &dyn HttpService,
    mut request: tiny_http::Request,
    config: &HttpServerConfig,
) {
    let method = request.method().as_str().to_string();
    let target = request.url().to_string();

    let mut response = match read_request(&mut request) {
        Ok(http_request) => service.handle_request(http_request).unwrap_or_else(|e| {
            error!(error = ?e, "service failed to handle request");
            error_response(HttpStatusCode::InternalServerError, &e.to_string())
        }),
        Err(e) => {
            warn!(error = %e, "rejected unreadable request");
            error_response(HttpStatusCode::BadRequest, &e.to_string())
        }
    };

    for (key, value) in &config.default_headers {
        if !response.headers().contains(key) {
            response.headers_mut().insert(key.as_str(), value.as_str());
        }
    }

    info!(
        method = %method,
        target = %target,
        status = response.status().as_u16(),
        "handled request"
    );

    if let Err(e) = request.respond(into_tiny_response(response, &config.server_name)) {
        warn!(error = %e, "failed to send response");
    }
}

fn read_request(request: &mut tiny_http::Request) -> ContactbookResult<HttpRequest> {
    let method = HttpMethod::parse(request.method().as_str())
        .ok_or_else(|| err!("Unsupported HTTP method {}", request.method()))?;

    let mut http_request = HttpRequest::new(method, request.url());
    for header in request.headers() {
        http_request = http_request.with_header(header.field.as_str().as_str(), header.value.as_str());
    }

    let mut body = Vec::new();
    request
        .as_reader()
        .read_to_end(&mut body)
        .map_err(|e| err!("Failed to read request body: {}", e))?;

    Ok(http_request.with_body(body))
}

fn error_response(status: HttpStatusCode, message: &str) -> HttpResponse {
    HttpResponse::json(status, serde_json::json!({ "error": message }).to_string())
}

fn into_tiny_response(
    response: HttpResponse,
    server_name: &str,
) -> tiny_http::Response<Cursor<Vec<u8>>> {
    let status = tiny_http::StatusCode(response.status().as_u16());

    let mut headers = Vec::new();
    for (key, value) in response.headers().iter().chain([("Server", server_name)]) {
        match tiny_http::Header::from_bytes(key.as_bytes(), value.as_bytes()) {
            Ok(header) => headers.push(header),
            Err(()) => warn!(header = key, "dropping invalid response header"),
        }
    }

    let body = response.into_body().into_bytes();
    let length = body.len();
    tiny_http::Response::new(status, headers, Cursor::new(body), Some(length), None)
}
