//! Host capability errors

use super::MboError;

/// Creates a host unavailable error
pub fn unavailable(capability: impl Into<String>) -> MboError {
    MboError::HostUnavailable {
        capability: capability.into(),
    }
}

/// Creates a host operation failed error
pub fn operation_failed(
    operation: impl Into<String>,
    name: impl Into<String>,
    reason: impl Into<String>,
) -> MboError {
    MboError::HostOperationFailed {
        operation: operation.into(),
        name: name.into(),
        reason: reason.into(),
    }
}
