//! File system errors

use std::path::Path;

use super::MboError;

/// Creates a temporary file error
pub fn temp_file_failed(dir: &Path, reason: impl Into<String>) -> MboError {
    MboError::TempFileFailed {
        dir: dir.display().to_string(),
        reason: reason.into(),
    }
}

/// Creates an archive extraction error
pub fn extract_failed(path: &Path, reason: impl Into<String>) -> MboError {
    MboError::ArchiveExtractFailed {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> MboError {
    MboError::IoError {
        message: message.into(),
        source: None,
    }
}
