/* 📖 # What is the Platform Abstraction Layer?

The PAL provides a trait-based abstraction over file access and the HTTP server,
enabling testable code:
- Testability: MockPal allows deterministic unit tests without filesystem or sockets
- Flexibility: Switch between real and in-memory implementations
- Consistency: All platform operations use the same error handling
*/

pub mod http;
pub mod mock;
pub mod real_pal;
mod traits;

pub use mock::MockPal;
pub use real_pal::RealPal;
pub use traits::{Pal, PalHandle};
