//! k-nearest-neighbour classification over stored image embeddings.
//!
//! Every stored example is scored against the query, the `k` best are taken
//! across all classes, and each neighbour casts one vote for its class.
//! Confidence per class is its share of the votes.

use pokedex_core::{
    ClassConfidence, ClassId, DatasetError, Embedding, ExampleStore, Matrix, Metric, Prediction,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum ClassifyError {
    #[error("no examples have been added to the classifier")]
    EmptyStore,

    #[error("k must be at least 1")]
    InvalidK,

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// KNN classifier trained by adding labelled embeddings.
///
/// The learned state is just the [`ExampleStore`]; it can be exported with
/// [`dataset`](Self::dataset) and restored with [`set_dataset`](Self::set_dataset).
#[derive(Debug, Clone, Default)]
pub struct KnnClassifier {
    store: ExampleStore,
    metric: Metric,
}

impl KnnClassifier {
    pub fn new(metric: Metric) -> Self {
        Self {
            store: ExampleStore::new(),
            metric,
        }
    }

    /// Wrap an existing (e.g. freshly loaded) example store.
    pub fn with_dataset(store: ExampleStore, metric: Metric) -> Self {
        Self { store, metric }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Add one training example for `class_id`.
    pub fn add_example(&mut self, embedding: &[f32], class_id: ClassId) -> Result<(), DatasetError> {
        self.store.add_example(embedding, class_id)
    }

    pub fn num_classes(&self) -> usize {
        self.store.num_classes()
    }

    pub fn num_examples(&self) -> usize {
        self.store.num_examples()
    }

    pub fn class_example_count(&self, class_id: ClassId) -> usize {
        self.store.class_example_count(class_id)
    }

    /// The learned examples, grouped by class.
    pub fn dataset(&self) -> &ExampleStore {
        &self.store
    }

    /// Replace the learned examples wholesale.
    pub fn set_dataset(&mut self, store: ExampleStore) {
        self.store = store;
    }

    pub fn into_dataset(self) -> ExampleStore {
        self.store
    }

    pub fn clear_class(&mut self, class_id: ClassId) -> bool {
        self.store.clear_class(class_id)
    }

    pub fn clear_all_classes(&mut self) {
        self.store.clear_all_classes();
    }

    /// Predict the class of `query` by majority vote among its `k` nearest examples.
    ///
    /// `k` is clamped to the number of stored examples. Vote ties go to the
    /// lowest class id; equal scores rank in store order.
    pub fn predict_class(&self, query: &[f32], k: usize) -> Result<Prediction, ClassifyError> {
        if self.store.is_empty() {
            return Err(ClassifyError::EmptyStore);
        }
        if k == 0 {
            return Err(ClassifyError::InvalidK);
        }
        let dim = self.store.dim().unwrap_or(0);
        if query.len() != dim {
            return Err(DatasetError::DimensionMismatch {
                expected: dim,
                actual: query.len(),
            }
            .into());
        }

        let query = prepare(query, self.metric);
        let classes = self.store.dataset();

        // (score, index into `classes`), in store order.
        let mut scored: Vec<(f32, usize)> = Vec::with_capacity(self.store.num_examples());
        for (idx, (_, matrix)) in classes.iter().enumerate() {
            score_rows(matrix, &query, self.metric, idx, &mut scored);
        }

        let k_eff = k.min(scored.len());
        // Stable sort keeps store order among equal scores.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut votes = vec![0usize; classes.len()];
        for &(_, idx) in &scored[..k_eff] {
            votes[idx] += 1;
        }

        let confidences: Vec<ClassConfidence> = classes
            .iter()
            .zip(&votes)
            .map(|((class_id, _), &n)| ClassConfidence {
                class_id: *class_id,
                confidence: n as f32 / k_eff as f32,
            })
            .collect();

        let (class_id, top_votes) = classes
            .iter()
            .zip(&votes)
            .map(|((class_id, _), &n)| (*class_id, n))
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .unwrap_or((0, 0));

        debug!(class_id, votes = top_votes, k = k_eff, "knn prediction");
        Ok(Prediction {
            class_id,
            confidences,
        })
    }

    /// Predict every query in order.
    pub fn predict_batch(
        &self,
        queries: &[Embedding],
        k: usize,
    ) -> Result<Vec<Prediction>, ClassifyError> {
        queries.iter().map(|q| self.predict_class(q, k)).collect()
    }
}

fn prepare(query: &[f32], metric: Metric) -> Vec<f32> {
    let mut q = query.to_vec();
    if metric == Metric::Cosine {
        normalize(&mut q);
    }
    q
}

/// Score each row of `matrix`; higher is nearer. NaN scores rank last.
fn score_rows(
    matrix: &Matrix,
    query: &[f32],
    metric: Metric,
    class_idx: usize,
    out: &mut Vec<(f32, usize)>,
) {
    for row in matrix.iter_rows() {
        let score = match metric {
            Metric::Cosine => {
                let norm = l2_norm(row);
                if norm == 0.0 { 0.0 } else { dot(query, row) / norm }
            }
            Metric::SquaredEuclidean => -squared_distance(query, row),
        };
        let score = if score.is_nan() { f32::NEG_INFINITY } else { score };
        out.push((score, class_idx));
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// L2-normalize a vector in place.
fn normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
