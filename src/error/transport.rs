//! Marketplace transport errors

use super::MboError;

/// Creates a transport failure error
pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> MboError {
    MboError::TransportFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates an unexpected status error
pub fn status(url: impl Into<String>, status: u16) -> MboError {
    MboError::MarketplaceStatus {
        url: url.into(),
        status,
    }
}

/// Creates an unknown marketplace module error
pub fn unknown_module(name: impl Into<String>) -> MboError {
    MboError::UnknownMarketplaceModule { name: name.into() }
}
