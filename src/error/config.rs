//! Configuration errors

use super::MboError;

/// Creates an invalid environment variable error
pub fn invalid_env(name: &str, reason: impl Into<String>) -> MboError {
    MboError::InvalidEnv {
        name: name.to_string(),
        reason: reason.into(),
    }
}
