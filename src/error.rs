//! Error types shared by the annotation engine

use std::path::PathBuf;

use crate::domain::AnnotationKind;

/// Geometry that cannot be computed from the given input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// Target rectangle too thin to be split into thirds
    #[error("degenerate rectangle {width}x{height}")]
    DegenerateRect { width: f32, height: f32 },
    /// `map_range` called with an empty input range
    #[error("division by zero: input range [{min}, {max}] is empty")]
    DivisionByZero { min: f32, max: f32 },
}

/// Malformed or unreadable input feed
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("widget '{key}' is missing '{field}'")]
    MissingField { key: String, field: &'static str },
    #[error("widget '{key}' has an invalid '{field}': {reason}")]
    InvalidField {
        key: String,
        field: &'static str,
        reason: String,
    },
    #[error("no widget with path '{0}' in this slide")]
    UnknownWidget(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Data(#[from] DataError),
    /// Nothing under the queried point; callers treat this as "nothing to do"
    #[error("nothing found at ({x}, {y})")]
    NotFound { x: f32, y: f32 },
    #[error("{0:?} is an interaction state and cannot be stored")]
    TransientKind(AnnotationKind),
}
