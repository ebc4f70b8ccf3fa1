// catalog-client/src/transport/http.rs
// HTTP transport - posts batches to the catalog API

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::Transport;
use crate::{CatalogError, CatalogResult, ClientConfig};

/// Error body returned by the API on non-success status codes
#[derive(serde::Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_message: Option<Value>,
}

/// Network transport using HTTP basic auth
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    api_url: String,
    app_id: String,
    app_password: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> CatalogResult<Self> {
        if config.app_id.is_empty() {
            return Err(CatalogError::Config("app id must not be empty".into()));
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            api_url: config.endpoint.api_url().to_string(),
            app_id: config.app_id.clone(),
            app_password: config.app_password.clone(),
        })
    }

    /// Url the batches are posted to
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn handle_response(&self, response: reqwest::Response) -> CatalogResult<Value> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            tracing::warn!(status = %status, "catalog API returned an error status");
            return Err(parse_error_body(status.as_u16(), &text));
        }
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| CatalogError::parse(format!("response body: {}", e)))
    }
}

/// The API reports errors either as an object or as a one-element array
fn parse_error_body(status: u16, text: &str) -> CatalogError {
    let parsed = serde_json::from_str::<ApiErrorResponse>(text).ok().or_else(|| {
        serde_json::from_str::<Vec<ApiErrorResponse>>(text)
            .ok()
            .and_then(|list| list.into_iter().next())
    });

    match parsed {
        Some(err) => {
            let code = if err.error_code == 0 {
                i64::from(status)
            } else {
                err.error_code
            };
            CatalogError::Application {
                code,
                message: crate::models::error_message_text(err.error_message.as_ref()),
            }
        }
        None => CatalogError::Application {
            code: i64::from(status),
            message: text.to_string(),
        },
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, payload: &Value) -> CatalogResult<Value> {
        tracing::debug!(url = %self.api_url, "sending catalog batch");
        let response = self
            .client
            .post(&self.api_url)
            .basic_auth(&self.app_id, Some(&self.app_password))
            .json(payload)
            .send()
            .await?;
        self.handle_response(response).await
    }
}
