//! Viewer-level failure taxonomy.

use thiserror::Error;

/// Why a diff load could not produce a comparable pair.
///
/// Checked in order: both images failing is reported as one condition,
/// then each side individually, then the geometric mismatch.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DiffFailure {
    /// Neither file decoded.
    #[error("both images failed to load")]
    BothFailed,
    /// The first file did not decode.
    #[error("image 1 failed to load")]
    FirstFailed,
    /// The second file did not decode.
    #[error("image 2 failed to load")]
    SecondFailed,
    /// Both decoded but their dimensions differ.
    #[error("image dimensions do not match")]
    DimensionMismatch,
}
