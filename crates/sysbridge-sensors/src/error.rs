//! Error types for the sensor normalization library.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the sensor source boundaries.
///
/// The aggregator never returns these; a failing reading degrades to an
/// absent value instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Sensor identifier does not end in a decimal core index.
    #[error("Malformed sensor identifier: {0:?}")]
    MalformedIdentifier(String),

    /// A snapshot needs at least one core.
    #[error("Invalid core count: {0}")]
    InvalidCoreCount(usize),

    /// Hardware monitor executable is missing.
    #[error("Hardware monitor not found at {0}")]
    HardwareMonitorNotFound(String),

    /// Hardware monitor exited unsuccessfully.
    #[error("Hardware monitor exited with {code:?}: {stderr}")]
    HardwareMonitorExit { code: Option<i32>, stderr: String },

    /// Hardware monitor did not finish in time.
    #[error("Hardware monitor timed out after {0:?}")]
    HardwareMonitorTimeout(Duration),

    /// I/O error while reading a sensor source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Hardware monitor output was not a valid hardware tree.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}
