//! Transport abstraction for batch requests

mod http;
mod memory;

pub use http::HttpTransport;
pub use memory::MemoryTransport;

use async_trait::async_trait;
use serde_json::Value;

use crate::CatalogResult;

/// Sends one assembled batch and returns the parsed JSON answer.
///
/// Network failures map to [`crate::CatalogError::Transport`], failures
/// reported by the API map to [`crate::CatalogError::Application`].
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, payload: &Value) -> CatalogResult<Value>;
}
