//! Error types for keyword deck operations.

use thiserror::Error;

/// Errors that can occur while reading a keyword deck.
#[derive(Error, Debug)]
pub enum KeywordError {
    /// A required keyword section is absent.
    #[error("missing keyword section {0}")]
    MissingSection(&'static str),

    /// The packed patch section ended early or held an unparsable card.
    #[error("malformed patch section{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    MalformedPatchSection {
        /// Input line number (1-indexed), if known.
        line: Option<usize>,
        /// Error message.
        message: String,
    },
}

impl KeywordError {
    /// Create a malformed patch section error.
    pub fn malformed(line: Option<usize>, message: impl Into<String>) -> Self {
        Self::MalformedPatchSection {
            line,
            message: message.into(),
        }
    }

    /// True for every error that means the patch section cannot be decoded.
    pub fn is_malformed_patch_section(&self) -> bool {
        matches!(
            self,
            Self::MalformedPatchSection { .. } | Self::MissingSection(_)
        )
    }
}

/// Result type for keyword deck operations.
pub type Result<T> = std::result::Result<T, KeywordError>;
