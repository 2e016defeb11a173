//! Core index extraction from hierarchical sensor identifiers.

use crate::{Error, Result};
use tracing::debug;

/// Parses the core index from the last `/` segment of an identifier.
///
/// `"/amdcpu/0/voltage/16"` yields 16. No bounds checking is done here;
/// callers validate against their core count before indexing.
pub fn extract_core_index(identifier: &str) -> Result<usize> {
    identifier
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| Error::MalformedIdentifier(identifier.to_string()))
}

/// Extracts the index and checks it lies in `0..core_count`.
pub fn core_slot(identifier: &str, core_count: usize) -> Option<usize> {
    match extract_core_index(identifier) {
        Ok(index) if index < core_count => Some(index),
        Ok(index) => {
            debug!(
                "Skipping sensor {}: core index {} out of range (cores: {})",
                identifier,
                index,
                core_count
            );
            None
        }
        Err(e) => {
            debug!("Skipping sensor: {}", e);
            None
        }
    }
}
