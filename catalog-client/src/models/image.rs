//! Image Model

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;

use crate::config::{Endpoint, ImageBaseUrl};

pub const MIN_IMAGE_SIZE: u32 = 50;
pub const MAX_IMAGE_SIZE: u32 = 1400;

/// Url prefix shared by every image a client constructs.
///
/// Images read the prefix when their url is requested, so changing it
/// affects images built before the change as well.
#[derive(Debug, Clone, Default)]
pub struct ImageUrlPrefix(Arc<RwLock<String>>);

impl ImageUrlPrefix {
    pub fn new(base: &ImageBaseUrl, endpoint: &Endpoint) -> Self {
        let prefix = Self::default();
        prefix.set(base, endpoint);
        prefix
    }

    pub fn set(&self, base: &ImageBaseUrl, endpoint: &Endpoint) {
        let value = match base {
            ImageBaseUrl::Default => endpoint.default_image_url().to_string(),
            ImageBaseUrl::Relative => String::new(),
            ImageBaseUrl::Url(url) => url.trim_end_matches('/').to_string(),
        };
        *self.0.write() = value;
    }

    /// Current prefix, empty for relative urls
    pub fn get(&self) -> String {
        self.0.read().clone()
    }
}

/// Image dimensions as delivered by the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Raw image fragment
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawImage {
    pub hash: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub image: Option<ImageSize>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "type")]
    pub image_type: Option<String>,
}

/// Product or variant image
#[derive(Debug, Clone)]
pub struct Image {
    hash: String,
    ext: Option<String>,
    mime_type: Option<String>,
    file_size: Option<u64>,
    size: Option<ImageSize>,
    tags: Vec<String>,
    image_type: Option<String>,
    prefix: ImageUrlPrefix,
}

impl Image {
    pub(crate) fn from_raw(raw: RawImage, prefix: ImageUrlPrefix) -> Self {
        Self {
            hash: raw.hash,
            ext: raw.ext,
            mime_type: raw.mime,
            file_size: raw.size,
            size: raw.image,
            tags: raw.tags,
            image_type: raw.image_type,
            prefix,
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn ext(&self) -> Option<&str> {
        self.ext.as_deref()
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn file_size(&self) -> Option<u64> {
        self.file_size
    }

    pub fn size(&self) -> Option<ImageSize> {
        self.size
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn image_type(&self) -> Option<&str> {
        self.image_type.as_deref()
    }

    /// Absolute url, or `/<hash>` when the client uses relative urls
    pub fn url(&self) -> String {
        format!("{}/{}", self.prefix.get(), self.hash)
    }

    /// Url of a scaled rendition; dimensions are clamped to the CDN limits
    pub fn url_with_size(&self, width: u32, height: u32) -> String {
        let width = width.clamp(MIN_IMAGE_SIZE, MAX_IMAGE_SIZE);
        let height = height.clamp(MIN_IMAGE_SIZE, MAX_IMAGE_SIZE);
        format!("{}?width={}&height={}", self.url(), width, height)
    }
}
