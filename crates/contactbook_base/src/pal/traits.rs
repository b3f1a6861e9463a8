use std::path::Path;
use std::sync::Arc;

use crate::ContactbookResult;

use super::http::{HttpServerConfig, HttpServerHandle, HttpService};

/* 📖 # Why is Pal a trait instead of a struct?

Using a trait enables two key benefits:
1. **Testability**: MockPal implements Pal for fast, deterministic tests without filesystem
   or network side effects
2. **Flexibility**: Code depends on the abstraction, not the concrete implementation

This is the Dependency Inversion Principle applied to files and the HTTP server.
*/

/// Platform Abstraction Layer (PAL) trait.
///
/// Two implementations are provided:
/// - `RealPal`: Uses the real filesystem via `std::fs` and serves HTTP with tiny_http
/// - `MockPal`: In-memory implementation for testing
///
/// Relative paths are resolved against the implementation's base directory.
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Check if a file exists at the given path.
    fn file_exists(&self, path: &Path) -> ContactbookResult<bool>;

    /// Read entire file contents as a UTF-8 string.
    fn read_file_to_string(&self, path: &Path) -> ContactbookResult<String>;

    /// Create a directory and all parent directories.
    fn create_directory_all(&self, path: &Path) -> ContactbookResult<()>;

    /// Start an HTTP server with the given service.
    ///
    /// Returns a handle to the running server. The server will start immediately
    /// and listen for connections. When the last handle is dropped (or shutdown() is called),
    /// the server will stop accepting new connections.
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> ContactbookResult<HttpServerHandle>;
}

/* 📖 # Why use Arc<dyn Pal> with PalHandle?

Arc enables cheap cloning of the entire PAL implementation, allowing it to be
shared across multiple parts of the application (thread-safe via dyn Pal bounds).
PalHandle wraps this for ergonomic Deref access and Clone support.
*/

/// Handle to a PAL implementation, enabling shared ownership.
///
/// # Examples
///
/// ```no_run
/// use contactbook_base::{RealPal, PalHandle};
///
/// let pal = PalHandle::new(RealPal::new(".".into()));
/// let pal_clone = pal.clone(); // Cheap clone, shares the same implementation
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    /// Create a new PalHandle from a Pal implementation.
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
