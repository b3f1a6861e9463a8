/* 📖 # Why have contactbook_base as a core library?
contactbook_base provides the error type, tracing setup and the platform abstraction
(files and the HTTP server) used across all crates.
This keeps error handling consistent and prevents circular dependencies between crates.
*/

pub mod error;
mod error_tests;
pub mod pal;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{ContactbookError, ContactbookResult, ErrorKind, ResultExt};
pub use pal::{MockPal, Pal, PalHandle, RealPal};
