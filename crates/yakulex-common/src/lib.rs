//! yakulex-common — Shared error taxonomy and HTTP transport used across all Yakulex crates.

pub mod error;
pub mod http;

// Re-export commonly used types
pub use error::{ApiError, TransportError, YakulexError};
pub use http::{HttpConfig, HttpTransport, RetryPolicy, RetryingClient, Transport};
