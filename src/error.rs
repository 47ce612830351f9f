//! Error types for index construction, insertion and relationship evaluation.

use crate::entity::ObjectId;
use feature_index_types::EnvelopeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Invalid extent: ({min_x}, {min_y}, {max_x}, {max_y})")]
    InvalidExtent {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },
    #[error("Invalid tolerance: {0} (must be finite and >= 0)")]
    InvalidTolerance(f64),
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Duplicate object id: {0}")]
    DuplicateObjectId(ObjectId),
    #[error("Empty input: index policy requires at least one entity")]
    EmptyInput,
    #[error("Unsupported relationship: {0}")]
    UnsupportedRelationship(String),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl From<EnvelopeError> for IndexError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::InvalidExtent {
                min_x,
                min_y,
                max_x,
                max_y,
            } => IndexError::InvalidExtent {
                min_x,
                min_y,
                max_x,
                max_y,
            },
            EnvelopeError::InvalidTolerance(eps) => IndexError::InvalidTolerance(eps),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
