//! Error handling for the specobs library
//!
//! This module provides a unified error type for all operations in the specobs
//! library: file access, message decoding, block traversal, range slicing and
//! exports.

use std::io;

use thiserror::Error;

/// A specialized Result type for specobs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for specobs operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (reading captures, writing exports)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The message container could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// CSV export failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The capture holds no measurement block at all
    #[error("File contains no measurement blocks")]
    EmptyFile,

    /// Timestamp scale code outside the known table
    #[error("Unsupported timestamp unit (scale code {0})")]
    UnsupportedTimestampUnit(i32),

    /// A block does not share the frequency axis of the first block
    #[error(
        "Block {block} axis mismatch: expected {expected_start_mhz}-{expected_end_mhz} MHz \
         with {expected_bins} bins, got {start_mhz}-{end_mhz} MHz with {bins} bins"
    )]
    AxisMismatch {
        block: usize,
        expected_start_mhz: f64,
        expected_end_mhz: f64,
        expected_bins: usize,
        start_mhz: f64,
        end_mhz: f64,
        bins: usize,
    },

    /// A stored sample does not fit in 16 bits
    #[error("Sample value {value} in block {block} does not fit in 16 bits")]
    SampleOutOfRange { block: usize, value: i32 },

    /// Requested frequency window lies (partly) outside the file bounds
    #[error(
        "Start / end frequency {start_mhz}-{end_mhz} MHz outside file bounds \
         {lower_mhz}-{upper_mhz} MHz"
    )]
    RangeOutOfBounds {
        start_mhz: f64,
        end_mhz: f64,
        lower_mhz: f64,
        upper_mhz: f64,
    },

    /// Requested frequency window has start above end
    #[error("Start frequency {start_mhz} MHz is above end frequency {end_mhz} MHz")]
    RangeInverted { start_mhz: f64, end_mhz: f64 },

    /// Y-axis window is empty or not finite
    #[error("Invalid y-axis bounds: {y_min} .. {y_max}")]
    InvalidYBounds { y_min: f64, y_max: f64 },

    /// Traversal stopped by the caller's cancellation flag
    #[error("Traversal cancelled after {0} blocks")]
    Cancelled(usize),

    /// Malformed data that fits none of the above
    #[error("Format error: {0}")]
    Format(String),
}

impl Error {
    /// Create a format error with a custom message
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }

    /// Whether the error is local to one requested operation.
    ///
    /// Range and y-bound errors leave the aggregate usable; everything else
    /// invalidates the file being processed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::RangeOutOfBounds { .. }
                | Error::RangeInverted { .. }
                | Error::InvalidYBounds { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("I/O error"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_format_error_constructor() {
        let err = Error::format("invalid format");
        assert!(matches!(err, Error::Format(_)));
        assert_eq!(err.to_string(), "Format error: invalid format");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::EmptyFile.to_string(),
            "File contains no measurement blocks"
        );
        assert_eq!(
            Error::UnsupportedTimestampUnit(15).to_string(),
            "Unsupported timestamp unit (scale code 15)"
        );
    }

    #[test]
    fn test_recoverable_errors() {
        let inverted = Error::RangeInverted {
            start_mhz: 160.0,
            end_mhz: 150.0,
        };
        assert!(inverted.is_recoverable());
        assert!(!Error::EmptyFile.is_recoverable());
        assert!(!Error::Cancelled(3).is_recoverable());
    }
}
