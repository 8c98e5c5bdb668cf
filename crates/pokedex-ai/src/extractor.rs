//! The seam between decoded images and embeddings.

use image::DynamicImage;
use pokedex_core::Embedding;

/// Turns decoded images into fixed-length embeddings.
///
/// Implementations are treated as pure: the same image always yields the
/// same embedding, and every embedding has [`dim`](Self::dim) values.
pub trait FeatureExtractor {
    /// Embedding dimensionality.
    fn dim(&self) -> usize;

    /// Embed a batch of images, one embedding per input, in order.
    fn infer_batch(&mut self, images: &[DynamicImage]) -> anyhow::Result<Vec<Embedding>>;

    /// Embed a single image.
    fn infer(&mut self, image: &DynamicImage) -> anyhow::Result<Embedding> {
        self.infer_batch(std::slice::from_ref(image))?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("extractor returned no embedding"))
    }
}
