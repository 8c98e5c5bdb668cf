//! Serializable dataset and prediction types shared between crates.

use serde::{Deserialize, Serialize};

use crate::ClassId;

/// One class of a persisted dataset: its examples flattened row-major.
///
/// The JSON field names (`classId`, `data`, `shape`) are the on-disk format
/// and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetEntry {
    pub class_id: ClassId,
    pub data: Vec<f32>,
    /// `[rows, cols]`.
    pub shape: [usize; 2],
}

/// A persisted dataset: one entry per class, in class insertion order.
pub type DatasetRecord = Vec<DatasetEntry>;

/// Result of classifying one embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub class_id: ClassId,
    /// Vote share per known class, in store order. Sums to 1.
    pub confidences: Vec<ClassConfidence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassConfidence {
    pub class_id: ClassId,
    pub confidence: f32,
}

impl Prediction {
    /// Confidence for `class_id`, 0 for classes the store does not know.
    pub fn confidence(&self, class_id: ClassId) -> f32 {
        self.confidences
            .iter()
            .find(|c| c.class_id == class_id)
            .map_or(0.0, |c| c.confidence)
    }

    /// Confidence of the predicted class.
    pub fn top_confidence(&self) -> f32 {
        self.confidence(self.class_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_uses_camel_case_field_names() {
        let entry = DatasetEntry {
            class_id: 2,
            data: vec![0.5, -1.25],
            shape: [1, 2],
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"classId":2,"data":[0.5,-1.25],"shape":[1,2]}"#);
    }

    #[test]
    fn record_parses_exported_document() {
        let json = r#"[
            {"classId": 0, "data": [1, 0, 0, 1], "shape": [2, 2]},
            {"classId": 1, "data": [0.25, 0.75], "shape": [1, 2]}
        ]"#;
        let record: DatasetRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record[0].shape, [2, 2]);
        assert_eq!(record[1].data, vec![0.25, 0.75]);
    }

    #[test]
    fn string_class_id_is_rejected() {
        let json = r#"[{"classId": "zero", "data": [1], "shape": [1, 1]}]"#;
        assert!(serde_json::from_str::<DatasetRecord>(json).is_err());
    }

    #[test]
    fn prediction_confidence_lookup() {
        let prediction = Prediction {
            class_id: 1,
            confidences: vec![
                ClassConfidence {
                    class_id: 0,
                    confidence: 0.25,
                },
                ClassConfidence {
                    class_id: 1,
                    confidence: 0.75,
                },
            ],
        };
        assert_eq!(prediction.top_confidence(), 0.75);
        assert_eq!(prediction.confidence(0), 0.25);
        assert_eq!(prediction.confidence(9), 0.0);
    }
}
