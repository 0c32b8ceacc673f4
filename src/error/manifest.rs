//! Manifest errors

use super::MboError;

/// Creates a manifest not found error
pub fn not_found(path: impl Into<String>) -> MboError {
    MboError::ManifestNotFound { path: path.into() }
}

/// Creates a manifest parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> MboError {
    MboError::ManifestParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid manifest error
pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> MboError {
    MboError::ManifestInvalid {
        path: path.into(),
        message: message.into(),
    }
}
