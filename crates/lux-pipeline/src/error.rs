//! Error types for pipeline operations.
//!
//! The viewer recovers from every variant locally: a failed decode leaves
//! the viewer empty with an overlay message, a failed conversion leaves
//! the previously prepared image untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`PipelineError`] as the error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors reported by a [`crate::Pipeline`] implementation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A file could not be decoded into an image.
    #[error("failed to decode {path}: {reason}")]
    Decode {
        /// Path that was handed to the decoder.
        path: PathBuf,
        /// Decoder-supplied reason.
        reason: String,
    },

    /// The pipeline rejected a conversion request.
    #[error("conversion failed: {reason}")]
    Conversion {
        /// Pipeline-supplied reason.
        reason: String,
    },

    /// A video frame index past the end of the stream was requested.
    #[error("frame {requested} out of range (stream has {available} frames)")]
    UnsupportedFrame {
        /// Frame index that was requested.
        requested: u32,
        /// Number of frames in the stream.
        available: u32,
    },
}

impl PipelineError {
    /// Creates a [`PipelineError::Decode`] error.
    #[inline]
    pub fn decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`PipelineError::Conversion`] error.
    #[inline]
    pub fn conversion(reason: impl Into<String>) -> Self {
        Self::Conversion {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a decode error.
    #[inline]
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
