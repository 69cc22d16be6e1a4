// Port Layer - Interfaces for external dependencies

pub mod clock; // For deterministic testing
pub mod http;

// Re-exports
pub use clock::{Clock, SystemClock};
pub use http::{ApiRequest, ApiResponse, HttpMethod, HttpTransport};
