// catalog-client/src/transport/memory.rs
// In-memory transport - canned answers for tests and offline demos

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::Transport;
use crate::{CatalogError, CatalogResult};

type Handler = Box<dyn Fn(&Value) -> CatalogResult<Value> + Send + Sync>;

/// Transport that never touches the network.
///
/// Queued replies are returned first, in order; once the queue is drained the
/// handler (if any) answers. Every payload is recorded.
#[derive(Default)]
pub struct MemoryTransport {
    replies: Mutex<VecDeque<CatalogResult<Value>>>,
    handler: Option<Handler>,
    requests: Mutex<Vec<Value>>,
}

impl std::fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransport")
            .field("queued_replies", &self.replies.lock().len())
            .field("has_handler", &self.handler.is_some())
            .field("requests", &self.requests.lock().len())
            .finish()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request with `handler` once the queue is empty
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&Value) -> CatalogResult<Value> + Send + Sync + 'static,
    {
        Self {
            handler: Some(Box::new(handler)),
            ..Self::default()
        }
    }

    /// Queue a successful reply
    pub fn push_response(&self, response: Value) {
        self.replies.lock().push_back(Ok(response));
    }

    /// Queue a failure
    pub fn push_error(&self, error: CatalogError) {
        self.replies.lock().push_back(Err(error));
    }

    /// Payloads sent so far
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().clone()
    }

    /// Number of transport calls made so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, payload: &Value) -> CatalogResult<Value> {
        self.requests.lock().push(payload.clone());

        if let Some(reply) = self.replies.lock().pop_front() {
            return reply;
        }
        match &self.handler {
            Some(handler) => handler(payload),
            None => Err(CatalogError::parse("no reply queued in memory transport")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_queue_then_handler() {
        let transport = MemoryTransport::with_handler(|payload| Ok(json!({ "echo": payload })));
        transport.push_response(json!(["queued"]));

        let first = transport.send(&json!([1])).await.unwrap();
        let second = transport.send(&json!([2])).await.unwrap();

        assert_eq!(first, json!(["queued"]));
        assert_eq!(second, json!({ "echo": [2] }));
        assert_eq!(transport.request_count(), 2);
        assert_eq!(transport.requests()[1], json!([2]));
    }

    #[tokio::test]
    async fn test_empty_queue_without_handler_fails() {
        let transport = MemoryTransport::new();
        assert!(transport.send(&json!([])).await.is_err());
    }
}
