//! Error types for the replication pipeline.

use patchspin_keyword::KeywordError;
use patchspin_math::MathError;
use thiserror::Error;

/// Errors that abort a replication run. No output is produced after any of
/// these.
#[derive(Error, Debug)]
pub enum PatchspinError {
    /// The input deck could not be decoded.
    #[error(transparent)]
    Keyword(#[from] KeywordError),

    /// Invalid rotation parameters.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Configuration values out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PatchspinError {
    /// True if the patch section could not be decoded.
    pub fn is_malformed_patch_section(&self) -> bool {
        matches!(self, Self::Keyword(e) if e.is_malformed_patch_section())
    }

    /// True if the rotation axis was not one of x, y, z.
    pub fn is_invalid_axis(&self) -> bool {
        matches!(self, Self::Math(MathError::InvalidAxis(_)))
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PatchspinError>;
