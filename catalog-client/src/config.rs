//! Client configuration

use crate::{CatalogError, CatalogResult};

const API_URL_LIVE: &str = "https://shop-api.aboutyou.de/api";
const API_URL_STAGE: &str = "http://shop-api.staging.aboutyou.de/api";
const API_URL_SANDBOX: &str = "http://shop-api.sandbox.aboutyou.de/api";

const IMAGE_URL_LIVE: &str = "http://cdn.aboutyou.de/file";
const IMAGE_URL_STAGE: &str = "http://mndb.staging.aboutyou.de/mmdb/file";
const IMAGE_URL_SANDBOX: &str = "http://mndb.sandbox.aboutyou.de/mmdb/file";

/// API environment the client talks to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Endpoint {
    #[default]
    Live,
    Stage,
    Sandbox,
    /// Absolute API url, images default to the live CDN
    Custom(String),
}

impl Endpoint {
    /// Parse `live`, `stage`, `sandbox` or an absolute url
    pub fn parse(value: &str) -> CatalogResult<Self> {
        match value.trim() {
            "" | "live" => Ok(Self::Live),
            "stage" => Ok(Self::Stage),
            "sandbox" => Ok(Self::Sandbox),
            url if url.starts_with("http://") || url.starts_with("https://") => {
                Ok(Self::Custom(url.trim_end_matches('/').to_string()))
            }
            other => Err(CatalogError::Config(format!("unknown endpoint `{}`", other))),
        }
    }

    /// Url the batch payload is posted to
    pub fn api_url(&self) -> &str {
        match self {
            Self::Live => API_URL_LIVE,
            Self::Stage => API_URL_STAGE,
            Self::Sandbox => API_URL_SANDBOX,
            Self::Custom(url) => url,
        }
    }

    /// Environment-dependent image url prefix
    pub fn default_image_url(&self) -> &'static str {
        match self {
            Self::Stage => IMAGE_URL_STAGE,
            Self::Sandbox => IMAGE_URL_SANDBOX,
            Self::Live | Self::Custom(_) => IMAGE_URL_LIVE,
        }
    }
}

/// Image url prefix setting
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageBaseUrl {
    /// Environment default
    #[default]
    Default,
    /// No prefix, images resolve to relative urls
    Relative,
    /// Explicit prefix, trailing slashes are trimmed
    Url(String),
}

/// Client configuration for connecting to the catalog API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Application id used for basic auth
    pub app_id: String,

    /// Application password used for basic auth
    pub app_password: String,

    /// API environment
    pub endpoint: Endpoint,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Image url prefix
    pub image_base_url: ImageBaseUrl,
}

impl ClientConfig {
    /// Create a new configuration for the live environment
    pub fn new(app_id: impl Into<String>, app_password: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_password: app_password.into(),
            endpoint: Endpoint::Live,
            timeout: 30,
            image_base_url: ImageBaseUrl::Default,
        }
    }

    /// Read `CATALOG_APP_ID`, `CATALOG_APP_PASSWORD`, `CATALOG_ENDPOINT`
    /// and `CATALOG_TIMEOUT_SECS` from the environment
    pub fn from_env() -> CatalogResult<Self> {
        let app_id = std::env::var("CATALOG_APP_ID")
            .map_err(|_| CatalogError::Config("CATALOG_APP_ID is not set".into()))?;
        let app_password = std::env::var("CATALOG_APP_PASSWORD")
            .map_err(|_| CatalogError::Config("CATALOG_APP_PASSWORD is not set".into()))?;

        let mut config = Self::new(app_id, app_password);
        if let Ok(endpoint) = std::env::var("CATALOG_ENDPOINT") {
            config.endpoint = Endpoint::parse(&endpoint)?;
        }
        if let Ok(timeout) = std::env::var("CATALOG_TIMEOUT_SECS") {
            config.timeout = timeout.parse().map_err(|_| {
                CatalogError::Config(format!("invalid CATALOG_TIMEOUT_SECS `{}`", timeout))
            })?;
        }
        Ok(config)
    }

    /// Set the API environment
    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the image url prefix
    pub fn with_image_base_url(mut self, base: ImageBaseUrl) -> Self {
        self.image_base_url = base;
        self
    }

    /// Create an HTTP transport from this configuration
    pub fn build_transport(&self) -> CatalogResult<crate::HttpTransport> {
        crate::HttpTransport::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_parse() {
        assert_eq!(Endpoint::parse("stage").unwrap(), Endpoint::Stage);
        assert_eq!(Endpoint::parse("").unwrap(), Endpoint::Live);
        assert_eq!(
            Endpoint::parse("http://localhost:9000/api/").unwrap(),
            Endpoint::Custom("http://localhost:9000/api".to_string())
        );
        assert!(Endpoint::parse("staging").is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("100", "secret")
            .with_endpoint(Endpoint::Sandbox)
            .with_timeout(5);

        assert_eq!(config.timeout, 5);
        assert_eq!(config.endpoint.api_url(), API_URL_SANDBOX);
        assert_eq!(config.endpoint.default_image_url(), IMAGE_URL_SANDBOX);
        assert_eq!(config.image_base_url, ImageBaseUrl::Default);
    }
}
