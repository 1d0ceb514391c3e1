//! Error types for template operations.

use thiserror::Error;

/// Result type for template operations.
pub type RemixResult<T> = Result<T, RemixError>;

/// Errors that can occur while loading or inspecting template data.
///
/// Generation, composition and merging never fail on expected edge cases;
/// these errors only surface at the loading edges.
#[derive(Debug, Error)]
pub enum RemixError {
    /// Two sections in one library share an id.
    #[error("Duplicate section id: {0}")]
    DuplicateSection(String),

    /// A master template id was not found.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Brand colours were supplied as a string that is not a JSON array.
    #[error("Invalid brand colors: {0}")]
    InvalidBrandColors(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading template data from disk failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
