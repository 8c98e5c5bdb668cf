//! The persisted dataset file: a single JSON document of dataset entries.
//!
//! Loaded at startup so a trained classifier can be reused without
//! re-extracting every training image, and written after training.

use std::io::Write;
use std::path::Path;

use pokedex_core::ExampleStore;
use tracing::{info, warn};

use crate::{StoreError, codec};

/// Write `store` to `path`, replacing any existing file atomically.
pub fn save(path: &Path, store: &ExampleStore) -> Result<(), StoreError> {
    let json = codec::to_json(store).map_err(StoreError::Encode)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    // Write beside the target so the rename stays on one filesystem.
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;

    info!(
        path = %path.display(),
        classes = store.num_classes(),
        examples = store.num_examples(),
        bytes = json.len(),
        "saved dataset"
    );
    Ok(())
}

/// Read and decode the dataset at `path`.
pub fn load(path: &Path) -> Result<ExampleStore, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    let store = codec::from_json(&text)?;

    info!(
        path = %path.display(),
        classes = store.num_classes(),
        examples = store.num_examples(),
        dim = store.dim().unwrap_or(0),
        "loaded dataset"
    );
    Ok(store)
}

/// Load the dataset at `path`, falling back to an empty (untrained) store.
///
/// A missing file is expected before the first training run; any other
/// failure is logged as a failed model load.
pub fn load_or_empty(path: &Path) -> ExampleStore {
    match load(path) {
        Ok(store) => store,
        Err(StoreError::NotFound(_)) => {
            info!(path = %path.display(), "no trained dataset found, starting empty");
            ExampleStore::new()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load trained model");
            ExampleStore::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn trained_store() -> ExampleStore {
        let mut store = ExampleStore::new();
        store.add_example(&[1.0, 0.0, 0.0], 0).unwrap();
        store.add_example(&[0.0, 1.0, 0.0], 1).unwrap();
        store.add_example(&[0.0, 0.9, 0.1], 1).unwrap();
        store.add_example(&[0.0, 0.0, 1.0], 2).unwrap();
        store
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("model.json");
        let store = trained_store();

        save(&path, &store).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn save_creates_parent_dirs_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("model.json");

        save(&path, &trained_store()).unwrap();
        save(&path, &ExampleStore::new()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let result = load(Path::new("/nonexistent/model.json"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn load_rejects_inconsistent_shape() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("model.json");
        std::fs::write(&path, r#"[{"classId":0,"data":[1,2,3],"shape":[2,2]}]"#).unwrap();

        let result = load(&path);
        assert!(matches!(result, Err(StoreError::Format(_))));
    }

    #[test]
    fn load_or_empty_falls_back_on_corrupt_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("model.json");
        std::fs::write(&path, "{ truncated").unwrap();

        let store = load_or_empty(&path);
        assert_eq!(store.num_classes(), 0);
    }

    #[test]
    fn load_or_empty_falls_back_on_missing_file() {
        let tmp = TempDir::new().unwrap();
        let store = load_or_empty(&tmp.path().join("absent.json"));
        assert!(store.is_empty());
    }
}
