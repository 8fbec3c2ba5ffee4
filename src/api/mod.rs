/// Catalog backend access
///
/// - `client.rs` - the HTTP adapter (`ApiClient`) and its retry policy
/// - `error.rs` - error normalization into a uniform message

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
