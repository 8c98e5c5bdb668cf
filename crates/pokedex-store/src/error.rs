use pokedex_core::{ClassId, DatasetError};
use thiserror::Error;

/// A persisted dataset that cannot be turned back into an example store.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("malformed dataset document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("class {class_id}: data length {len} does not match shape [{rows}, {cols}]")]
    ShapeMismatch {
        class_id: ClassId,
        len: usize,
        rows: usize,
        cols: usize,
    },

    #[error("class {0} has an empty shape")]
    EmptyClass(ClassId),

    #[error("class {0} appears more than once")]
    DuplicateClass(ClassId),

    #[error("class {0} has a value outside the finite f32 range")]
    NonFinite(ClassId),

    #[error("class {class_id} has {actual} columns, expected {expected}")]
    InconsistentDimension {
        class_id: ClassId,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("dataset file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid dataset: {0}")]
    Format(#[from] FormatError),

    #[error("encoding dataset: {0}")]
    Encode(serde_json::Error),
}
