// lecli Infrastructure - HTTP Adapter
// Implements: HttpTransport

pub mod reqwest_transport;

pub use reqwest_transport::{ReqwestTransport, DEFAULT_TIMEOUT};
