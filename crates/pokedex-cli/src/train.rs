//! Training pipeline: load labelled images, embed them, save the dataset.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use pokedex_ai::{ImageEmbedder, KnnClassifier, TrainingSummary};
use pokedex_core::{ExampleStore, PokedexConfig};
use pokedex_store::StoreError;

pub struct TrainStats {
    pub summary: TrainingSummary,
    pub total_examples: usize,
    pub elapsed_secs: f64,
}

/// Run the full training pass: images on disk → embeddings → dataset JSON.
pub async fn run_train(
    model_dir: &Path,
    data_dir: &Path,
    out: &Path,
    config: &PokedexConfig,
    append: bool,
) -> anyhow::Result<TrainStats> {
    let start = Instant::now();

    // 1. Start from the saved examples or from scratch. A dataset that exists
    //    but cannot be read must not be overwritten.
    let existing = if append {
        load_existing(out)?
    } else {
        ExampleStore::new()
    };
    let classifier = KnnClassifier::with_dataset(existing, config.classifier.metric);

    // 2. Decode every training image into memory.
    let images = pokedex_ai::load_labeled_images(data_dir).await?;
    anyhow::ensure!(
        !images.is_empty(),
        "no training images found under {}",
        data_dir.display()
    );

    // 3. Embed on the blocking pool; inference is CPU-bound.
    let model_dir = model_dir.to_path_buf();
    let extractor_config = config.extractor.clone();
    let training_config = config.training.clone();
    let (classifier, summary) = tokio::task::spawn_blocking(move || {
        let mut classifier = classifier;
        let mut embedder = ImageEmbedder::load(&model_dir, &extractor_config)?;
        let summary = pokedex_ai::train(&mut embedder, &mut classifier, &images, &training_config)?;
        anyhow::Ok((classifier, summary))
    })
    .await??;

    // 4. Persist.
    pokedex_store::save(out, classifier.dataset())
        .with_context(|| format!("writing dataset to {}", out.display()))?;

    Ok(TrainStats {
        summary,
        total_examples: classifier.num_examples(),
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

/// The dataset to append to: empty when `out` does not exist yet, an error
/// when it exists but cannot be loaded.
fn load_existing(out: &Path) -> anyhow::Result<ExampleStore> {
    match pokedex_store::load(out) {
        Ok(store) => Ok(store),
        Err(StoreError::NotFound(_)) => Ok(ExampleStore::new()),
        Err(e) => Err(e)
            .with_context(|| format!("cannot append to existing dataset {}", out.display())),
    }
}
