//! ONNX Runtime image embedding pipeline.
//!
//! Runs a frozen convolutional network (e.g. MobileNet v2 exported without its
//! classification head) over preprocessed NCHW images. The model directory
//! must contain `model.onnx`. Outputs of shape `[N, C]` are used as-is;
//! `[N, C, H, W]` feature maps are mean-pooled over the spatial axes.

use std::path::Path;

use image::DynamicImage;
use ort::session::Session;
use ort::value::Tensor;
use pokedex_core::{Embedding, ExtractorConfig, Normalization};
use tracing::{debug, info};

use crate::FeatureExtractor;
use crate::preprocess::{preprocess_batch, tensor_len};

/// Image embedding generator using ONNX Runtime.
pub struct ImageEmbedder {
    session: Session,
    input_name: String,
    image_size: u32,
    normalization: Normalization,
    dim: usize,
}

impl ImageEmbedder {
    /// Load a feature-extraction model from a directory containing `model.onnx`.
    pub fn load(model_dir: &Path, config: &ExtractorConfig) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");

        let session = Session::builder()?.commit_from_file(&model_path)?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| anyhow::anyhow!("model has no inputs"))?;
        let output_type = session
            .outputs()
            .first()
            .map(|output| output.dtype())
            .ok_or_else(|| anyhow::anyhow!("model has no outputs"))?;

        // Feature dimension is the channel axis of the first output.
        let dim = infer_dim(output_type)
            .ok_or_else(|| anyhow::anyhow!("cannot infer embedding dimension from model output"))?;

        info!(
            dim,
            input = %input_name,
            image_size = config.image_size,
            model = %model_path.display(),
            "loaded image embedding model"
        );
        Ok(Self {
            session,
            input_name,
            image_size: config.image_size,
            normalization: config.normalization,
            dim,
        })
    }

    /// Square input resolution fed to the network.
    pub fn image_size(&self) -> u32 {
        self.image_size
    }

    fn run(&mut self, images: &[DynamicImage]) -> anyhow::Result<Vec<Embedding>> {
        let batch_size = images.len();
        let size = self.image_size as i64;

        let pixels = preprocess_batch(images, self.image_size, self.normalization);
        debug_assert_eq!(pixels.len(), batch_size * tensor_len(self.image_size));

        let shape = [batch_size as i64, 3, size, size];
        let input = Tensor::from_array((shape, pixels.into_boxed_slice()))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input])?;

        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            (dims.len() == 2 || dims.len() == 4)
                && dims[0] as usize == batch_size
                && dims[1] as usize == self.dim,
            "unexpected output shape: {dims:?}, expected [{batch_size}, {}] or [{batch_size}, {}, H, W]",
            self.dim,
            self.dim
        );

        // Spatial positions per channel; 1 for already-pooled outputs.
        let spatial: usize = dims[2..].iter().map(|&d| d as usize).product();
        let per_item = self.dim * spatial;

        let embeddings = output_data
            .chunks_exact(per_item)
            .take(batch_size)
            .map(|item| pool(item, self.dim, spatial))
            .collect::<Vec<_>>();

        debug!(batch_size, spatial, "embedded image batch");
        Ok(embeddings)
    }
}

impl FeatureExtractor for ImageEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn infer_batch(&mut self, images: &[DynamicImage]) -> anyhow::Result<Vec<Embedding>> {
        if images.is_empty() {
            return Ok(vec![]);
        }
        self.run(images)
    }
}

/// Mean over the spatial positions of each channel of a `[C, S]` block.
fn pool(item: &[f32], dim: usize, spatial: usize) -> Embedding {
    if spatial == 1 {
        return item.to_vec();
    }
    item.chunks_exact(spatial)
        .take(dim)
        .map(|channel| channel.iter().sum::<f32>() / spatial as f32)
        .collect()
}

/// Try to infer the embedding dimension from the ONNX model output type.
fn infer_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => {
            // Axis 1 is the channel / feature axis for both [N, C] and [N, C, H, W].
            shape
                .get(1)
                .and_then(|&d| if d > 0 { Some(d as usize) } else { None })
        }
        _ => None,
    }
}
