//! Installer configuration
//!
//! This module contains:
//! - [`settings`]: version gates, marketplace coordinates, and manifest naming
//! - [`help`]: locale to help URL tables

pub mod help;
pub mod settings;

// Re-export commonly used types
pub use help::HelpUrls;
pub use settings::{CompanionModule, Settings};
