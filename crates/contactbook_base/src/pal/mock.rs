use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::ErrorKind;
use crate::{ContactbookError, ContactbookResult, err};

use super::http::{HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService};
use super::traits::Pal;

/* 📖 # Why use HashMap for MockPal storage?

MockPal uses in-memory storage with Arc<Mutex<T>> for several reasons:
1. **Speed**: No filesystem I/O, deterministic and fast for unit tests
2. **Isolation**: No side effects on the real filesystem, no sockets opened
3. **Control**: Easy to inject specific files or test scenarios
4. **Thread-safe**: Mutex allows concurrent test execution
*/

/// In-memory PAL implementation for testing.
///
/// # Examples
///
/// ```
/// use contactbook_base::{MockPal, Pal};
/// use std::path::Path;
///
/// let mock = MockPal::new();
/// mock.add_file("contactbook.toml", b"port = 8080".to_vec());
/// let content = mock.read_file_to_string(Path::new("contactbook.toml")).unwrap();
/// assert_eq!(content, "port = 8080");
/// ```
#[derive(Debug, Clone)]
pub struct MockPal {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
    directories: Arc<Mutex<HashSet<PathBuf>>>,
    http_servers: Arc<Mutex<HashMap<u16, Arc<dyn HttpService>>>>,
    next_port: Arc<AtomicU16>,
}

impl MockPal {
    /// Create a new empty MockPal.
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            directories: Arc::new(Mutex::new(HashSet::new())),
            http_servers: Arc::new(Mutex::new(HashMap::new())),
            next_port: Arc::new(AtomicU16::new(10000)),
        }
    }

    /// Add a file to the mock storage.
    pub fn add_file(&self, path: impl Into<PathBuf>, content: Vec<u8>) {
        self.files.lock().unwrap().insert(path.into(), content);
    }

    /// Check whether a directory was created through the PAL.
    pub fn has_directory(&self, path: &Path) -> bool {
        self.directories.lock().unwrap().contains(path)
    }

    /// Simulate an HTTP request to a running server.
    ///
    /// Looks up the registered service for the given port and invokes it directly,
    /// without any network traffic.
    pub fn simulate_request(
        &self,
        port: u16,
        request: HttpRequest,
    ) -> ContactbookResult<HttpResponse> {
        let service = self
            .http_servers
            .lock()
            .unwrap()
            .get(&port)
            .cloned()
            .ok_or_else(|| err!("No HTTP server registered on port {}", port))?;

        service.handle_request(request)
    }

    /// Get the number of registered HTTP servers.
    pub fn http_server_count(&self) -> usize {
        self.http_servers.lock().unwrap().len()
    }
}

impl Default for MockPal {
    fn default() -> Self {
        Self::new()
    }
}

impl Pal for MockPal {
    fn file_exists(&self, path: &Path) -> ContactbookResult<bool> {
        Ok(self.files.lock().unwrap().contains_key(path))
    }

    fn read_file_to_string(&self, path: &Path) -> ContactbookResult<String> {
        let content = self
            .files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                Box::new(ContactbookError::new(ErrorKind::FileError {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("File not found: {}", path.display()),
                    ),
                }))
            })?;
        String::from_utf8(content)
            .map_err(|_e| err!("File is not valid UTF-8: {}", path.display()))
    }

    fn create_directory_all(&self, path: &Path) -> ContactbookResult<()> {
        let mut directories = self.directories.lock().unwrap();
        for ancestor in path.ancestors().filter(|p| !p.as_os_str().is_empty()) {
            directories.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> ContactbookResult<HttpServerHandle> {
        // Assign a port - use config port if provided, otherwise auto-assign
        let port = match config.port {
            Some(p) => p,
            None => self.next_port.fetch_add(1, Ordering::SeqCst),
        };

        self.http_servers
            .lock()
            .unwrap()
            .insert(port, Arc::from(service));

        Ok(HttpServerHandle::new(port))
    }
}
