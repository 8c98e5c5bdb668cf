//! Core types for Pokedex: embeddings, the per-class example store, dataset records, and configuration.

pub mod config;
mod error;
pub mod examples;
pub mod matrix;
pub mod record;
pub mod species;

pub use config::{
    ClassifierConfig, ConfigError, DeviceProfile, ExtractorConfig, Metric, Normalization,
    PokedexConfig, TrainingConfig,
};
pub use error::DatasetError;
pub use examples::{ClassId, ExampleStore};
pub use matrix::Matrix;
pub use record::{ClassConfidence, DatasetEntry, DatasetRecord, Prediction};
pub use species::{Species, class_label, parse_class_dir};

/// A fixed-length feature vector produced by the extractor for one image.
pub type Embedding = Vec<f32>;
