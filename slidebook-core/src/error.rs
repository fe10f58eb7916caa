//! Error types for slide viewer construction and configuration.
//!
//! Out-of-range navigation and malformed gesture sessions are not errors:
//! they are absorbed by the view state machine and the classifier.

use thiserror::Error;

/// Result type for slidebook operations.
pub type SlideResult<T> = Result<T, SlideError>;

/// Errors that can occur when building or feeding a viewer.
#[derive(Debug, Error)]
pub enum SlideError {
    /// A deck must contain at least one slide.
    #[error("Deck is empty: at least one slide is required")]
    EmptyDeck,

    /// Manifest entries must be listed in index order starting at zero.
    #[error("Manifest out of order: expected index {expected}, found {found}")]
    ManifestOrder {
        /// Index implied by the entry's position.
        expected: usize,
        /// Index declared by the entry.
        found: usize,
    },

    /// Configuration values are unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The viewport has a negative or non-finite extent.
    #[error("Invalid viewport: {width}x{height}")]
    InvalidViewport {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },

    /// Manifest or config serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A loader failed to materialize a slide image.
    #[error("Failed to preload slide {index}: {reason}")]
    Preload {
        /// Slide index that failed.
        index: usize,
        /// Loader-provided reason.
        reason: String,
    },
}
