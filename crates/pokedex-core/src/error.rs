use thiserror::Error;

use crate::ClassId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("embedding is empty")]
    EmptyEmbedding,

    #[error("embedding has {actual} dimensions, store expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("data length {len} does not match shape [{rows}, {cols}]")]
    ShapeMismatch { len: usize, rows: usize, cols: usize },

    #[error("class {0} has no examples")]
    EmptyClass(ClassId),

    #[error("class {0} appears more than once")]
    DuplicateClass(ClassId),

    #[error("class {0} has a non-finite value (NaN or infinity)")]
    NonFinite(ClassId),
}
