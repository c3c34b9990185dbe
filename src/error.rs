//! Error types shared across the crate.
//!
//! Every fallible public operation returns [`CoalseqError`]. The variant set
//! mirrors the stable kinds used throughout the tree sequence subsystem;
//! [`CoalseqError::code`] maps each variant back onto the legacy integer
//! convention (`MSP_ERR_*`) for callers that persist or display error codes
//! rather than the `Display` message.

use thiserror::Error;

/// The single error type returned by every fallible operation in this crate.
#[derive(Error, Debug)]
pub enum CoalseqError {
    #[error("generic error: {0}")]
    Generic(String),

    #[error("out of memory")]
    NoMemory,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad file format: {0}")]
    FileFormat(String),

    #[error("file version mismatch: {0}")]
    FileVersion(String),

    #[error("unsupported file version: {0}")]
    UnsupportedFileVersion(String),

    #[error("bad mode: {0}")]
    BadMode(String),

    #[error("bad parameter value: {0}")]
    BadParamValue(String),

    #[error("index out of bounds: {0}")]
    OutOfBounds(String),

    #[error("bad ordering requested: {0}")]
    BadOrdering(String),

    #[error("bad mutation: {0}")]
    BadMutation(String),

    #[error("bad population model: {0}")]
    BadPopulationModel(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("overflow: {0}")]
    Overflow(String),
}

impl CoalseqError {
    /// Stable legacy integer code for this error kind, matching the
    /// `MSP_ERR_*` constants of the original C error table. Used only at the
    /// persistence/CLI boundary; library code should match on the enum
    /// variant itself, not on this code.
    pub fn code(&self) -> i32 {
        match self {
            CoalseqError::Generic(_) => -1,
            CoalseqError::NoMemory => -2,
            CoalseqError::Io(_) => -3,
            CoalseqError::FileFormat(_) => -4,
            CoalseqError::FileVersion(_) => -5,
            CoalseqError::UnsupportedFileVersion(_) => -6,
            CoalseqError::BadMode(_) => -7,
            CoalseqError::BadParamValue(_) => -8,
            CoalseqError::OutOfBounds(_) => -9,
            CoalseqError::BadOrdering(_) => -10,
            CoalseqError::BadMutation(_) => -11,
            CoalseqError::BadPopulationModel(_) => -12,
            CoalseqError::UnsupportedOperation(_) => -13,
            CoalseqError::Overflow(_) => -14,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoalseqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_and_distinct() {
        let errs: Vec<CoalseqError> = vec![
            CoalseqError::Generic("x".into()),
            CoalseqError::NoMemory,
            CoalseqError::FileFormat("x".into()),
            CoalseqError::FileVersion("x".into()),
            CoalseqError::UnsupportedFileVersion("x".into()),
            CoalseqError::BadMode("x".into()),
            CoalseqError::BadParamValue("x".into()),
            CoalseqError::OutOfBounds("x".into()),
            CoalseqError::BadOrdering("x".into()),
            CoalseqError::BadMutation("x".into()),
            CoalseqError::BadPopulationModel("x".into()),
            CoalseqError::UnsupportedOperation("x".into()),
            CoalseqError::Overflow("x".into()),
        ];
        let mut codes: Vec<i32> = errs.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errs.len());
    }
}
