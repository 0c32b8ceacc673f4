//! Blocking HTTP marketplace client

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;

use super::{DownloadRequest, MarketplaceClient};
use crate::config::Settings;
use crate::error::{Result, transport};

/// Marketplace client posting download requests over HTTP
#[derive(Debug, Clone)]
pub struct HttpMarketplace {
    client: Client,
    base_url: String,
}

impl HttpMarketplace {
    /// Create a client for `base_url` with a request timeout and a redirect limit
    pub fn new(base_url: &str, timeout: Duration, max_redirects: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(max_redirects))
            .build()
            .map_err(|e| transport::failed(base_url, e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.marketplace_url,
            settings.http_timeout,
            settings.max_redirects,
        )
    }

    /// Full request URL
    pub fn url_for(&self, request: &DownloadRequest) -> String {
        format!("{}/?{}", self.base_url, request.query_string())
    }
}

impl MarketplaceClient for HttpMarketplace {
    fn download(&self, request: &DownloadRequest) -> Result<Vec<u8>> {
        let url = self.url_for(request);
        tracing::info!("downloading module {} from {url}", request.module_id);

        let response = self
            .client
            .post(&url)
            .send()
            .map_err(|e| transport::failed(&url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport::status(&url, status.as_u16()));
        }

        let body = response
            .bytes()
            .map_err(|e| transport::failed(&url, e.to_string()))?;
        tracing::debug!("received {} bytes for module {}", body.len(), request.module_id);
        Ok(body.to_vec())
    }
}
