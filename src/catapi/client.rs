//! HTTP client against The Cat API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use thiserror::Error;

use super::types::{CatImage, CatPhoto};

/// Fixed upstream search endpoint.
pub const API_ENDPOINT: &str = "https://api.thecatapi.com/v1/images/search";

/// Upper bound tool handlers apply to any upstream fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum CatApiError {
    #[error("Cat API request failed with status {0}")]
    Status(u16),
    #[error("Cat API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Cat API returned an empty result set")]
    EmptyResponse,
    #[error("Cat API response is missing an image URL")]
    MissingUrl,
}

/// Source of cat images. Implemented by [`CatApiClient`] in production and
/// by recording stubs in tests.
#[async_trait]
pub trait CatImageSource: Send + Sync {
    /// Fetch up to `limit` breed-tagged photos in random order.
    async fn fetch_gallery(&self, limit: u32) -> Result<Vec<CatPhoto>, CatApiError>;

    /// Fetch a single random image URL, breed metadata not required.
    async fn fetch_random_image_url(&self) -> Result<String, CatApiError>;
}

/// Client for The Cat API. Without an API key requests go out
/// unauthenticated and are subject to upstream rate limits.
pub struct CatApiClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl CatApiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    async fn search(&self, query: &[(&str, String)]) -> Result<Vec<CatImage>, CatApiError> {
        let mut request = self
            .http
            .get(API_ENDPOINT)
            .header(ACCEPT, "application/json")
            .query(query);

        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(CatApiError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CatImageSource for CatApiClient {
    async fn fetch_gallery(&self, limit: u32) -> Result<Vec<CatPhoto>, CatApiError> {
        let images = self
            .search(&[
                ("limit", limit.to_string()),
                ("has_breeds", "1".to_string()),
                ("order", "RAND".to_string()),
            ])
            .await?;

        Ok(images.into_iter().map(CatPhoto::from).collect())
    }

    async fn fetch_random_image_url(&self) -> Result<String, CatApiError> {
        let images = self.search(&[]).await?;
        let first = images.into_iter().next().ok_or(CatApiError::EmptyResponse)?;

        if first.url.is_empty() {
            return Err(CatApiError::MissingUrl);
        }
        Ok(first.url)
    }
}
