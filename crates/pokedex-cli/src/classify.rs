use std::path::Path;

use pokedex_ai::{FeatureExtractor, ImageEmbedder, KnnClassifier};
use pokedex_core::{PokedexConfig, Prediction};

/// Classify the image at `image_path` against the dataset at `dataset_path`.
pub async fn run_classify(
    model_dir: &Path,
    dataset_path: &Path,
    image_path: &Path,
    k: usize,
    config: &PokedexConfig,
) -> anyhow::Result<Prediction> {
    let classifier = KnnClassifier::with_dataset(
        pokedex_store::load_or_empty(dataset_path),
        config.classifier.metric,
    );
    anyhow::ensure!(
        classifier.num_classes() > 0,
        "no trained classes in {}; run `pokedex train` first",
        dataset_path.display()
    );

    let image = pokedex_ai::load_image(image_path).await?;

    let model_dir = model_dir.to_path_buf();
    let extractor_config = config.extractor.clone();
    let embedding = tokio::task::spawn_blocking(move || {
        let mut embedder = ImageEmbedder::load(&model_dir, &extractor_config)?;
        embedder.infer(&image)
    })
    .await??;

    Ok(classifier.predict_class(&embedding, k)?)
}
