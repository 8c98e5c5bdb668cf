//! Plain-text rendering of predictions, datasets, and training summaries.

use std::fmt::Write;

use pokedex_ai::TrainingSummary;
use pokedex_core::{ExampleStore, Prediction, class_label};

const LABEL_WIDTH: usize = 12;

/// One line per known class with its vote share, the predicted class marked.
///
/// ```text
/// KNN Predictions
///   Bulbasaur    - Probability: 66.67%  <
///   Charmander   - Probability: 33.33%
///   Squirtle     - Probability: 0.00%
/// ```
pub fn render_prediction(prediction: &Prediction) -> String {
    let mut out = String::from("KNN Predictions");
    for c in &prediction.confidences {
        let marker = if c.class_id == prediction.class_id {
            "  <"
        } else {
            ""
        };
        let _ = write!(
            out,
            "\n  {:<LABEL_WIDTH$} - Probability: {:.2}%{marker}",
            class_label(c.class_id),
            c.confidence * 100.0
        );
    }
    out
}

pub fn render_dataset(store: &ExampleStore) -> String {
    if store.is_empty() {
        return "Dataset is empty (untrained)".to_string();
    }
    let mut out = format!(
        "{} classes, {} examples, {} dimensions",
        store.num_classes(),
        store.num_examples(),
        store.dim().unwrap_or(0)
    );
    for (class_id, matrix) in store.dataset() {
        let _ = write!(
            out,
            "\n  {:>3}  {:<LABEL_WIDTH$} {:>5} examples",
            class_id,
            class_label(*class_id),
            matrix.rows()
        );
    }
    out
}

pub fn render_training(summary: &TrainingSummary) -> String {
    let mut out = format!(
        "Trained {} examples ({} skipped by per-class limit)",
        summary.added(),
        summary.skipped()
    );
    for tally in &summary.classes {
        let _ = write!(
            out,
            "\n  {:<LABEL_WIDTH$} +{}",
            class_label(tally.class_id),
            tally.added
        );
        if tally.skipped > 0 {
            let _ = write!(out, " ({} skipped)", tally.skipped);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokedex_ai::ClassTally;
    use pokedex_core::ClassConfidence;

    #[test]
    fn prediction_lists_every_class_and_marks_winner() {
        let prediction = Prediction {
            class_id: 0,
            confidences: vec![
                ClassConfidence {
                    class_id: 0,
                    confidence: 2.0 / 3.0,
                },
                ClassConfidence {
                    class_id: 1,
                    confidence: 1.0 / 3.0,
                },
                ClassConfidence {
                    class_id: 2,
                    confidence: 0.0,
                },
            ],
        };
        let text = render_prediction(&prediction);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "  Bulbasaur    - Probability: 66.67%  <");
        assert_eq!(lines[2], "  Charmander   - Probability: 33.33%");
        assert_eq!(lines[3], "  Squirtle     - Probability: 0.00%");
    }

    #[test]
    fn dataset_summary() {
        let mut store = ExampleStore::new();
        store.add_example(&[1.0, 0.0], 2).unwrap();
        store.add_example(&[0.0, 1.0], 2).unwrap();
        store.add_example(&[1.0, 1.0], 11).unwrap();

        let text = render_dataset(&store);
        assert!(text.starts_with("2 classes, 3 examples, 2 dimensions"));
        assert!(text.contains("Squirtle"));
        assert!(text.contains("class 11"));
        assert_eq!(render_dataset(&ExampleStore::new()), "Dataset is empty (untrained)");
    }

    #[test]
    fn training_summary_mentions_skips() {
        let summary = TrainingSummary {
            classes: vec![
                ClassTally {
                    class_id: 1,
                    added: 50,
                    skipped: 3,
                },
                ClassTally {
                    class_id: 2,
                    added: 4,
                    skipped: 0,
                },
            ],
        };
        let text = render_training(&summary);
        assert!(text.starts_with("Trained 54 examples (3 skipped by per-class limit)"));
        assert!(text.contains("Charmander   +50 (3 skipped)"));
        assert!(text.contains("Squirtle     +4"));
        assert!(!text.contains("+4 ("));
    }
}
