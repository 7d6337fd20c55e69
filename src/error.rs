// src/error.rs
use thiserror::Error;

/// Errors raised anywhere in the overlay. None of them are fatal to the page:
/// callers log and degrade.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("request failed: {0}")]
    Network(#[from] gloo_net::Error),

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid comment record: {0}")]
    InvalidRecord(#[from] RecordError),

    #[error("missing page structure: {0}")]
    MissingStructure(String),

    #[error("image has no rendered geometry ({width}x{height})")]
    DegenerateGeometry { width: f64, height: f64 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Reasons a comment record is rejected at the fetch boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("record has no numeric vertical position")]
    MissingVerticalPosition,

    #[error("field `{0}` is not a number")]
    NonNumeric(&'static str),

    #[error("field `{0}` is missing")]
    MissingField(&'static str),

    #[error("comment text is empty")]
    EmptyText,
}
