/* 📖 # Why a dedicated HTTP module in the PAL?

The HTTP abstraction allows the application to serve HTTP requests while remaining
fully testable with MockPal. This enables:

- **Testable web services**: MockPal routes simulated requests straight into the service
- **Consistent interface**: Single API for both real and test scenarios
- **Synchronous simplicity**: No async runtime, one thread per request

This module provides raw HTTP types and abstractions for building REST APIs.
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use percent_encoding::percent_decode_str;

/// HTTP methods supported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Parse an HTTP method from a string.
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    /// Convert the method to its string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HTTP headers collection.
///
/// Names are matched case-insensitively; the spelling of the first insert is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    inner: Vec<(String, String)>,
}

impl HttpHeaders {
    /// Create empty headers.
    pub fn new() -> Self {
        Self { inner: Vec::new() }
    }

    /// Insert a header, replacing any existing value with the same name.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .inner
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.inner.push((key, value)),
        }
    }

    /// Get a header value.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.inner
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    }

    /// Check if a header exists.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// HTTP message body content.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HttpBody(Vec<u8>);

impl HttpBody {
    /// Create an empty body.
    pub fn empty() -> Self {
        Self(vec![])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get content as a string if valid UTF-8.
    pub fn as_string(&self) -> Option<String> {
        String::from_utf8(self.0.clone()).ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl std::fmt::Debug for HttpBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HttpBody").field(&self.0.len()).finish()
    }
}

impl From<Vec<u8>> for HttpBody {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl From<String> for HttpBody {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<&str> for HttpBody {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// HTTP request structure.
///
/// `target` is the raw request target as received, including any query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: HttpMethod,
    target: String,
    headers: HttpHeaders,
    body: HttpBody,
}

impl HttpRequest {
    /// Create a new HTTP request.
    pub fn new(method: HttpMethod, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HttpHeaders::new(),
            body: HttpBody::empty(),
        }
    }

    /// Get the HTTP method.
    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    /// Get the raw request target (path plus query string).
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get the request path without the query string.
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Get the path split into percent-decoded segments, ignoring empty ones.
    pub fn path_segments(&self) -> Vec<String> {
        self.path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
            .collect()
    }

    /// Look up the first query parameter with the given name.
    ///
    /// Values are percent-decoded and `+` is read as a space.
    pub fn query_param(&self, key: &str) -> Option<String> {
        let (_, query) = self.target.split_once('?')?;
        query.split('&').find_map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            if name == key {
                let value = value.replace('+', " ");
                Some(percent_decode_str(&value).decode_utf8_lossy().into_owned())
            } else {
                None
            }
        })
    }

    /// Get the request headers.
    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    /// Get the request body.
    pub fn body(&self) -> &HttpBody {
        &self.body
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<HttpBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }
}

/// HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatusCode {
    Ok = 200,
    Created = 201,
    NoContent = 204,
    BadRequest = 400,
    NotFound = 404,
    InternalServerError = 500,
}

impl HttpStatusCode {
    /// Get the numeric status code.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

/// HTTP response structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: HttpStatusCode,
    headers: HttpHeaders,
    body: HttpBody,
}

impl HttpResponse {
    /// Create a new response with the given status.
    pub fn new(status: HttpStatusCode) -> Self {
        Self {
            status,
            headers: HttpHeaders::new(),
            body: HttpBody::empty(),
        }
    }

    /// Create a 200 OK response.
    pub fn ok() -> Self {
        Self::new(HttpStatusCode::Ok)
    }

    /// Create a 204 No Content response.
    pub fn no_content() -> Self {
        Self::new(HttpStatusCode::NoContent)
    }

    /// Get the status code.
    pub fn status(&self) -> HttpStatusCode {
        self.status
    }

    /// Get the headers.
    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    /// Get mutable access to headers.
    pub fn headers_mut(&mut self) -> &mut HttpHeaders {
        &mut self.headers
    }

    /// Get the body.
    pub fn body(&self) -> &HttpBody {
        &self.body
    }

    /// Take ownership of the body.
    pub fn into_body(self) -> HttpBody {
        self.body
    }

    /// Set the response body.
    pub fn with_body(mut self, body: impl Into<HttpBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Set the Content-Type header.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    /// Create a JSON response with the given status.
    pub fn json(status: HttpStatusCode, body: impl Into<String>) -> Self {
        Self::new(status)
            .with_content_type("application/json")
            .with_body(body.into())
    }
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on. If None, the OS will assign an available port.
    pub port: Option<u16>,
    /// Server name used in responses.
    pub server_name: String,
    /// Headers added to every response that does not already set them, including
    /// the replies the server generates itself.
    pub default_headers: Vec<(String, String)>,
}

impl HttpServerConfig {
    /// Create a new configuration with the given host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the server name.
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    /// Add a header to every response.
    pub fn with_default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((key.into(), value.into()));
        self
    }

    /// Get the address string (host:port, port 0 for OS-assigned).
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port.unwrap_or(0))
    }
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: None,
            server_name: "contactbook".to_string(),
            default_headers: Vec::new(),
        }
    }
}

/* 📖 # Why a single HttpService trait?

The service receives raw HttpRequest objects and returns HttpResponse objects.
This gives the application full control over routing and request handling, and lets
MockPal hand requests straight to the service in tests.
*/

/// Trait for handling HTTP requests.
pub trait HttpService: std::fmt::Debug + Send + Sync + 'static {
    /// Handle an HTTP request and return a response.
    ///
    /// Errors are returned as `ContactbookResult::Err` and are converted to an
    /// HTTP 500 response with a JSON `error` body by the PAL implementation.
    fn handle_request(&self, request: HttpRequest) -> crate::ContactbookResult<HttpResponse>;
}

/// Handle to a running HTTP server.
///
/// Clones share the same server. When the last clone is dropped the server
/// stops accepting new connections.
#[derive(Debug, Clone)]
pub struct HttpServerHandle {
    port: u16,
    shutdown: Arc<AtomicBool>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl HttpServerHandle {
    /// Create a new handle for the given port.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            shutdown: Arc::new(AtomicBool::new(false)),
            worker: Arc::new(Mutex::new(None)),
        }
    }

    /// Attach the thread running the accept loop so `wait()` can join it.
    pub fn with_worker(self, worker: JoinHandle<()>) -> Self {
        if let Ok(mut slot) = self.worker.lock() {
            *slot = Some(worker);
        }
        self
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Signal the server to shut down.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Access the shutdown flag (for internal use by implementations).
    pub fn shutdown_flag(&self) -> &Arc<AtomicBool> {
        &self.shutdown
    }

    /// Block until the accept loop exits. Returns immediately for servers without a worker.
    pub fn wait(&self) {
        let worker = self.worker.lock().ok().and_then(|mut slot| slot.take());
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}

impl Drop for HttpServerHandle {
    fn drop(&mut self) {
        if Arc::strong_count(&self.worker) == 1 {
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_from_str() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("delete"), Some(HttpMethod::Delete)); // Case insensitive
        assert_eq!(HttpMethod::parse("OPTIONS"), Some(HttpMethod::Options));
        assert_eq!(HttpMethod::parse("INVALID"), None);
    }

    #[test]
    fn test_http_headers_case_insensitive() {
        let mut headers = HttpHeaders::new();
        headers.insert("Content-Type", "text/plain");
        headers.insert("content-type", "application/json");

        assert_eq!(
            headers.get("CONTENT-TYPE"),
            Some(&"application/json".to_string())
        );
        assert_eq!(headers.iter().count(), 1);
        assert_eq!(headers.iter().next().unwrap().0, "Content-Type");
        assert!(!headers.contains("Authorization"));
    }

    #[test]
    fn test_request_path_strips_query() {
        let request = HttpRequest::new(HttpMethod::Get, "/contacts?page=2&limit=5");
        assert_eq!(request.path(), "/contacts");
        assert_eq!(request.target(), "/contacts?page=2&limit=5");
    }

    #[test]
    fn test_request_query_param() {
        let request = HttpRequest::new(HttpMethod::Get, "/contacts?page=2&limit=&q=a%20b+c");
        assert_eq!(request.query_param("page"), Some("2".to_string()));
        assert_eq!(request.query_param("limit"), Some(String::new()));
        assert_eq!(request.query_param("q"), Some("a b c".to_string()));
        assert_eq!(request.query_param("missing"), None);

        let no_query = HttpRequest::new(HttpMethod::Get, "/contacts");
        assert_eq!(no_query.query_param("page"), None);
    }

    #[test]
    fn test_request_path_segments_are_decoded() {
        let request = HttpRequest::new(HttpMethod::Delete, "/contacts/abc%2Fdef/");
        assert_eq!(request.path_segments(), vec!["contacts", "abc/def"]);
    }

    #[test]
    fn test_http_body() {
        let body = HttpBody::from("Hello, World!");
        assert_eq!(body.as_string(), Some("Hello, World!".to_string()));
        assert_eq!(body.len(), 13);
        assert!(HttpBody::empty().is_empty());
    }

    #[test]
    fn test_json_response() {
        let response = HttpResponse::json(HttpStatusCode::Created, "{\"id\":\"x\"}");
        assert_eq!(response.status().as_u16(), 201);
        assert_eq!(
            response.headers().get("content-type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(response.body().as_string().unwrap(), "{\"id\":\"x\"}");
    }

    #[test]
    fn test_http_server_config() {
        let config = HttpServerConfig::new("0.0.0.0")
            .with_port(3000)
            .with_server_name("test-server");

        assert_eq!(config.address(), "0.0.0.0:3000");
        assert_eq!(config.server_name, "test-server");
        assert!(config.default_headers.is_empty());
        assert_eq!(HttpServerConfig::default().address(), "127.0.0.1:0");
    }

    #[test]
    fn test_http_server_handle_shutdown_on_last_drop() {
        let handle = HttpServerHandle::new(8080);
        let flag = Arc::clone(handle.shutdown_flag());
        let clone = handle.clone();

        drop(clone);
        assert!(!flag.load(Ordering::SeqCst));

        drop(handle);
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_wait_without_worker_returns() {
        let handle = HttpServerHandle::new(8080);
        handle.wait();
        assert_eq!(handle.port(), 8080);
    }
}
