//! Error types for lecture-discussion

/// Comment loading and posting errors
#[derive(Debug, thiserror::Error)]
pub enum DiscussionError {
    #[error("Comment source error: {0}")]
    Source(String),

    #[error("Reply is missing its parent comment")]
    MissingParent,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
