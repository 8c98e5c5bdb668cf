//! Conversion between an [`ExampleStore`] and its flat, serializable record form.
//!
//! Each class becomes one `{classId, data, shape}` entry with its examples
//! flattened row-major. Finite f32 values round-trip exactly through
//! serde_json; numbers that parse to infinity (e.g. `1e40`) are rejected.

use pokedex_core::{ClassId, DatasetEntry, DatasetRecord, ExampleStore, Matrix};

use crate::FormatError;

/// Flatten every class of `store`, in class insertion order.
pub fn encode(store: &ExampleStore) -> DatasetRecord {
    store
        .dataset()
        .iter()
        .map(|(class_id, matrix)| DatasetEntry {
            class_id: *class_id,
            data: matrix.as_slice().to_vec(),
            shape: matrix.shape(),
        })
        .collect()
}

/// Rebuild a store from its record form, validating every entry.
pub fn decode(record: DatasetRecord) -> Result<ExampleStore, FormatError> {
    let mut classes: Vec<(ClassId, Matrix)> = Vec::with_capacity(record.len());
    let mut dim: Option<usize> = None;

    for DatasetEntry {
        class_id,
        data,
        shape: [rows, cols],
    } in record
    {
        if rows == 0 || cols == 0 {
            return Err(FormatError::EmptyClass(class_id));
        }
        if classes.iter().any(|(id, _)| *id == class_id) {
            return Err(FormatError::DuplicateClass(class_id));
        }
        match dim {
            Some(expected) if expected != cols => {
                return Err(FormatError::InconsistentDimension {
                    class_id,
                    expected,
                    actual: cols,
                });
            }
            _ => dim = Some(cols),
        }

        if data.iter().any(|v| !v.is_finite()) {
            return Err(FormatError::NonFinite(class_id));
        }

        let len = data.len();
        let matrix = Matrix::from_flat(data, rows, cols).map_err(|_| FormatError::ShapeMismatch {
            class_id,
            len,
            rows,
            cols,
        })?;
        classes.push((class_id, matrix));
    }

    Ok(ExampleStore::from_classes(classes)?)
}

/// Serialize `store` as the JSON dataset document.
pub fn to_json(store: &ExampleStore) -> Result<String, serde_json::Error> {
    serde_json::to_string(&encode(store))
}

/// Parse a JSON dataset document into a store.
pub fn from_json(text: &str) -> Result<ExampleStore, FormatError> {
    let record: DatasetRecord = serde_json::from_str(text)?;
    decode(record)
}
