//! Platform version comparison
//!
//! Host platform versions come in several shapes (`1.7.6`, `1.7.8.10`, `8.1`,
//! `8.1.0-beta.1`), so they are compared component-wise on their numeric parts
//! rather than as semantic versions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{MboError, Result};

/// A dotted numeric version of arbitrary length
#[derive(Debug, Clone)]
pub struct PlatformVersion {
    raw: String,
    parts: Vec<u64>,
}

impl PlatformVersion {
    /// Parse a version string.
    ///
    /// Each dot-separated component contributes its leading digits; parsing stops at
    /// the first component without any (so `8.1.0-beta` reads as `8.1.0`).
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        let mut parts = Vec::new();

        for component in raw.split('.') {
            let digits: String = component.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() {
                break;
            }
            let value = digits.parse::<u64>().map_err(|_| MboError::InvalidVersion {
                version: input.to_string(),
            })?;
            parts.push(value);
            if digits.len() != component.len() {
                break;
            }
        }

        if parts.is_empty() {
            return Err(MboError::InvalidVersion {
                version: input.to_string(),
            });
        }

        Ok(Self {
            raw: raw.to_string(),
            parts,
        })
    }

    /// Build a version from numeric components
    pub fn from_parts(parts: &[u64]) -> Self {
        let raw = parts
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Self {
            raw,
            parts: parts.to_vec(),
        }
    }

    /// The version as given
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn component(&self, index: usize) -> u64 {
        self.parts.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for PlatformVersion {
    type Err = MboError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for PlatformVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for PlatformVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PlatformVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PlatformVersion {}
