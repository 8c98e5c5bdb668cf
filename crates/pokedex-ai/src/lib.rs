//! Inference layer: ONNX Runtime image embeddings and k-nearest-neighbour classification.

#[cfg(feature = "onnx")]
mod embedder;
mod extractor;
pub mod images;
mod knn;
pub mod preprocess;
pub mod training;

#[cfg(feature = "onnx")]
pub use embedder::ImageEmbedder;
pub use extractor::FeatureExtractor;
pub use images::{LabeledImage, load_image, load_labeled_images};
pub use knn::{ClassifyError, KnnClassifier};
pub use training::{ClassTally, TrainingSummary, train};
