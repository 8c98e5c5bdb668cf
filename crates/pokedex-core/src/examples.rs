//! Per-class storage of training embeddings.
//!
//! The store maps each class id to a matrix whose rows are the embeddings
//! added for that class. Classes keep their first-insertion order and rows
//! keep their append order, so the serialized dataset is stable across
//! save/load cycles. Every class shares one embedding dimension.

use tracing::debug;

use crate::{DatasetError, Matrix};

/// Identifier of a trained class. Ids 0..=2 are the [`Species`](crate::Species) table.
pub type ClassId = u32;

/// Embeddings grouped by class, in class insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExampleStore {
    classes: Vec<(ClassId, Matrix)>,
}

impl ExampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from per-class matrices, validating the store invariants.
    pub fn from_classes(classes: Vec<(ClassId, Matrix)>) -> Result<Self, DatasetError> {
        let mut store = Self::new();
        store.set_dataset(classes)?;
        Ok(store)
    }

    /// Append `embedding` as a new row of `class_id`, creating the class if absent.
    pub fn add_example(&mut self, embedding: &[f32], class_id: ClassId) -> Result<(), DatasetError> {
        if embedding.is_empty() {
            return Err(DatasetError::EmptyEmbedding);
        }
        // serde_json writes NaN and infinities as `null`, which cannot be read back.
        if !all_finite(embedding) {
            return Err(DatasetError::NonFinite(class_id));
        }
        if let Some(dim) = self.dim()
            && dim != embedding.len()
        {
            return Err(DatasetError::DimensionMismatch {
                expected: dim,
                actual: embedding.len(),
            });
        }

        match self.classes.iter_mut().find(|(id, _)| *id == class_id) {
            Some((_, matrix)) => matrix.push_row(embedding)?,
            None => {
                let mut matrix = Matrix::with_cols(embedding.len());
                matrix.push_row(embedding)?;
                self.classes.push((class_id, matrix));
                debug!(class_id, dim = embedding.len(), "created class");
            }
        }
        Ok(())
    }

    /// Number of distinct classes stored.
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Total number of examples across all classes.
    pub fn num_examples(&self) -> usize {
        self.classes.iter().map(|(_, m)| m.rows()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Embedding dimension shared by every class, `None` while empty.
    pub fn dim(&self) -> Option<usize> {
        self.classes.first().map(|(_, m)| m.cols())
    }

    /// Number of examples stored for `class_id` (0 when unknown).
    pub fn class_example_count(&self, class_id: ClassId) -> usize {
        self.get(class_id).map_or(0, Matrix::rows)
    }

    /// Matrix of examples for `class_id`.
    pub fn get(&self, class_id: ClassId) -> Option<&Matrix> {
        self.classes
            .iter()
            .find(|(id, _)| *id == class_id)
            .map(|(_, m)| m)
    }

    /// Class ids in insertion order.
    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes.iter().map(|(id, _)| *id)
    }

    /// Read-only view of every class and its examples, in insertion order.
    pub fn dataset(&self) -> &[(ClassId, Matrix)] {
        &self.classes
    }

    /// Replace the whole contents, e.g. when restoring a persisted dataset.
    ///
    /// On error the store is left unchanged.
    pub fn set_dataset(&mut self, classes: Vec<(ClassId, Matrix)>) -> Result<(), DatasetError> {
        validate(&classes)?;
        self.classes = classes;
        debug!(
            classes = self.num_classes(),
            examples = self.num_examples(),
            "replaced example store contents"
        );
        Ok(())
    }

    /// Remove a class and all of its examples. Returns whether it existed.
    pub fn clear_class(&mut self, class_id: ClassId) -> bool {
        let before = self.classes.len();
        self.classes.retain(|(id, _)| *id != class_id);
        before != self.classes.len()
    }

    pub fn clear_all_classes(&mut self) {
        self.classes.clear();
    }
}

fn validate(classes: &[(ClassId, Matrix)]) -> Result<(), DatasetError> {
    let dim = classes.first().map(|(_, m)| m.cols());
    for (i, (class_id, matrix)) in classes.iter().enumerate() {
        if matrix.rows() == 0 || matrix.cols() == 0 {
            return Err(DatasetError::EmptyClass(*class_id));
        }
        if let Some(expected) = dim
            && matrix.cols() != expected
        {
            return Err(DatasetError::DimensionMismatch {
                expected,
                actual: matrix.cols(),
            });
        }
        if classes[..i].iter().any(|(id, _)| id == class_id) {
            return Err(DatasetError::DuplicateClass(*class_id));
        }
        if !all_finite(matrix.as_slice()) {
            return Err(DatasetError::NonFinite(*class_id));
        }
    }
    Ok(())
}

fn all_finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn num_classes_counts_distinct_ids() {
        let mut store = ExampleStore::new();
        for class_id in [2, 0, 2, 1, 0, 2] {
            store.add_example(&[class_id as f32, 1.0], class_id).unwrap();
        }
        assert_eq!(store.num_classes(), 3);
        assert_eq!(store.num_examples(), 6);
        assert_eq!(store.class_example_count(2), 3);
        assert_eq!(store.class_example_count(7), 0);
    }

    #[test]
    fn classes_keep_insertion_order() {
        let mut store = ExampleStore::new();
        store.add_example(&[1.0], 5).unwrap();
        store.add_example(&[2.0], 1).unwrap();
        store.add_example(&[3.0], 5).unwrap();

        let ids: Vec<ClassId> = store.class_ids().collect();
        assert_eq!(ids, vec![5, 1]);
        assert_eq!(store.get(5).unwrap().as_slice(), &[1.0, 3.0]);
    }

    #[test]
    fn add_rejects_empty_and_mismatched_embeddings() {
        let mut store = ExampleStore::new();
        assert_eq!(store.add_example(&[], 0), Err(DatasetError::EmptyEmbedding));

        store.add_example(&[1.0, 2.0], 0).unwrap();
        assert_eq!(
            store.add_example(&[1.0, 2.0, 3.0], 1),
            Err(DatasetError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(store.num_classes(), 1);
    }

    #[test]
    fn add_rejects_non_finite_values() {
        let mut store = ExampleStore::new();
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(
                store.add_example(&[bad, 1.0], 2),
                Err(DatasetError::NonFinite(2))
            );
        }
        assert!(store.is_empty());

        store.add_example(&[f32::MAX, f32::MIN], 2).unwrap();
        assert_eq!(store.num_examples(), 1);
    }

    #[test]
    fn set_dataset_replaces_contents() {
        let mut store = ExampleStore::new();
        store.add_example(&[9.0, 9.0], 0).unwrap();

        let replacement = vec![
            (1, Matrix::from_flat(vec![1.0, 0.0], 1, 2).unwrap()),
            (2, Matrix::from_flat(vec![0.0, 1.0, 0.5, 0.5], 2, 2).unwrap()),
        ];
        store.set_dataset(replacement).unwrap();

        assert_eq!(store.num_classes(), 2);
        assert!(store.get(0).is_none());
        assert_eq!(store.class_example_count(2), 2);
    }

    #[test]
    fn set_dataset_rejects_invalid_input_and_keeps_old_contents() {
        let mut store = ExampleStore::new();
        store.add_example(&[1.0, 1.0], 0).unwrap();
        let before = store.clone();

        let duplicate = vec![
            (1, Matrix::from_flat(vec![1.0, 0.0], 1, 2).unwrap()),
            (1, Matrix::from_flat(vec![0.0, 1.0], 1, 2).unwrap()),
        ];
        assert_eq!(
            store.set_dataset(duplicate),
            Err(DatasetError::DuplicateClass(1))
        );

        let mixed_dims = vec![
            (0, Matrix::from_flat(vec![1.0, 0.0], 1, 2).unwrap()),
            (1, Matrix::from_flat(vec![0.0, 1.0, 0.0], 1, 3).unwrap()),
        ];
        assert!(matches!(
            store.set_dataset(mixed_dims),
            Err(DatasetError::DimensionMismatch { .. })
        ));

        let non_finite = vec![(4, Matrix::from_flat(vec![1.0, f32::NAN], 1, 2).unwrap())];
        assert_eq!(
            store.set_dataset(non_finite),
            Err(DatasetError::NonFinite(4))
        );

        let empty_class = vec![(3, Matrix::with_cols(2))];
        assert_eq!(
            store.set_dataset(empty_class),
            Err(DatasetError::EmptyClass(3))
        );

        assert_eq!(store, before);
    }

    #[test]
    fn clear_operations() {
        let mut store = ExampleStore::new();
        store.add_example(&[1.0], 0).unwrap();
        store.add_example(&[2.0], 1).unwrap();

        assert!(store.clear_class(0));
        assert!(!store.clear_class(0));
        assert_eq!(store.num_classes(), 1);

        store.clear_all_classes();
        assert!(store.is_empty());
        assert_eq!(store.dim(), None);
    }
}
