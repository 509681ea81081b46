//! Error handling for cutscene camera `.dat` files

use std::io;
use thiserror::Error;

/// Errors that can occur when working with `.dat` camera files
#[derive(Debug, Error)]
pub enum DatError {
    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A block could not be parsed and was skipped
    ///
    /// The parser recovers from this by producing an empty track; the
    /// variant is reported through
    /// [`parse_with_recovery`](crate::parser::DatParser::parse_with_recovery)
    /// so callers inspecting individual blocks can classify the failure.
    #[error("malformed block {index}: {reason}")]
    MalformedBlock {
        /// Zero-based index of the block in the file
        index: usize,
        /// Why the block was rejected
        reason: String,
    },

    /// An entry carried fewer numbers than the active profile requires
    ///
    /// The parser recovers by dropping the entry; reported alongside the
    /// parsed file by
    /// [`parse_with_recovery`](crate::parser::DatParser::parse_with_recovery).
    #[error("arity mismatch in block {block}: expected {expected} numbers, found {found}")]
    ArityMismatch {
        /// Zero-based index of the block in the file
        block: usize,
        /// Numeric fields the active profile requires (time plus values)
        expected: usize,
        /// Usable numeric fields present in the entry
        found: usize,
    },

    /// Field of view outside the valid trigonometric domain
    #[error("field of view out of range: {0} degrees (must be within (0, 180))")]
    FovOutOfRange(f64),

    /// Focal length must be a positive distance
    #[error("invalid focal length: {0} mm")]
    InvalidFocalLength(f64),

    /// Data validation failed
    #[error("validation error: {0}")]
    Validation(String),
}

/// Type alias for Results from `.dat` operations
pub type Result<T> = std::result::Result<T, DatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DatError::MalformedBlock {
            index: 1,
            reason: "count line is not an integer".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "malformed block 1: count line is not an integer"
        );

        let error = DatError::FovOutOfRange(185.0);
        assert!(format!("{}", error).contains("185"));
    }
}
