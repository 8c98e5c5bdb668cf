//! Transfer-learning pass: extract embeddings and add them as KNN examples.

use anyhow::Context;
use image::DynamicImage;
use pokedex_core::{ClassId, TrainingConfig};
use tracing::{debug, info};

use crate::{FeatureExtractor, KnnClassifier, LabeledImage};

/// Examples added and skipped for one class during a training pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassTally {
    pub class_id: ClassId,
    pub added: usize,
    /// Dropped because the class had reached its example limit.
    pub skipped: usize,
}

/// Outcome of [`train`], one tally per class in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingSummary {
    pub classes: Vec<ClassTally>,
}

impl TrainingSummary {
    pub fn added(&self) -> usize {
        self.classes.iter().map(|t| t.added).sum()
    }

    pub fn skipped(&self) -> usize {
        self.classes.iter().map(|t| t.skipped).sum()
    }

    fn tally(&mut self, class_id: ClassId) -> &mut ClassTally {
        let idx = match self.classes.iter().position(|t| t.class_id == class_id) {
            Some(idx) => idx,
            None => {
                self.classes.push(ClassTally {
                    class_id,
                    added: 0,
                    skipped: 0,
                });
                self.classes.len() - 1
            }
        };
        &mut self.classes[idx]
    }
}

/// Embed `images` and add them to `classifier`.
///
/// Classes stop accepting examples once they reach the configured per-class
/// limit for the device profile (counting examples already in the
/// classifier). Images are embedded `config.batch_size` at a time.
pub fn train<E>(
    extractor: &mut E,
    classifier: &mut KnnClassifier,
    images: &[LabeledImage],
    config: &TrainingConfig,
) -> anyhow::Result<TrainingSummary>
where
    E: FeatureExtractor + ?Sized,
{
    let limit = config.example_limit();
    let mut summary = TrainingSummary::default();

    let mut selected: Vec<&LabeledImage> = Vec::with_capacity(images.len());
    for labeled in images {
        let existing = classifier.class_example_count(labeled.class_id);
        let tally = summary.tally(labeled.class_id);
        if limit.is_some_and(|max| existing + tally.added >= max) {
            tally.skipped += 1;
            continue;
        }
        tally.added += 1;
        selected.push(labeled);
    }

    for chunk in selected.chunks(config.batch_size.max(1)) {
        let batch: Vec<DynamicImage> = chunk.iter().map(|li| li.image.clone()).collect();
        let embeddings = extractor
            .infer_batch(&batch)
            .with_context(|| format!("embedding batch starting at {}", chunk[0].source.display()))?;
        anyhow::ensure!(
            embeddings.len() == chunk.len(),
            "extractor returned {} embeddings for {} images",
            embeddings.len(),
            chunk.len()
        );

        for (labeled, embedding) in chunk.iter().zip(&embeddings) {
            classifier
                .add_example(embedding, labeled.class_id)
                .with_context(|| format!("adding {}", labeled.source.display()))?;
        }
        debug!(batch = chunk.len(), "added training batch");
    }

    for tally in &summary.classes {
        info!(
            class_id = tally.class_id,
            added = tally.added,
            skipped = tally.skipped,
            total = classifier.class_example_count(tally.class_id),
            "trained class"
        );
    }
    Ok(summary)
}
