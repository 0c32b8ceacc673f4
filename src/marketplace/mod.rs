//! Marketplace transport
//!
//! The installer only needs one thing from the marketplace: the package archive of a
//! module for a given platform version. [`MarketplaceClient`] is that seam;
//! [`HttpMarketplace`] is the production implementation.

pub mod http;

pub use http::HttpMarketplace;

use crate::error::Result;

/// Release channel requested from the marketplace
pub const CHANNEL: &str = "stable";

/// Download method requested from the marketplace
pub const METHOD: &str = "module";

/// A package download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Marketplace module identifier
    pub module_id: u64,
    /// Host platform version the package must be compatible with
    pub platform_version: String,
}

impl DownloadRequest {
    pub fn new(module_id: u64, platform_version: impl Into<String>) -> Self {
        Self {
            module_id,
            platform_version: platform_version.into(),
        }
    }

    /// Query parameters, in the order the marketplace documents them
    pub fn params(&self) -> [(&'static str, String); 4] {
        [
            ("id_module", self.module_id.to_string()),
            ("channel", CHANNEL.to_string()),
            ("method", METHOD.to_string()),
            ("version", self.platform_version.clone()),
        ]
    }

    /// The encoded query string (`id_module=..&channel=stable&method=module&version=..`)
    pub fn query_string(&self) -> String {
        self.params()
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Something that can fetch module packages
pub trait MarketplaceClient {
    /// Download the package archive; the body bytes are returned as-is
    fn download(&self, request: &DownloadRequest) -> Result<Vec<u8>>;
}
