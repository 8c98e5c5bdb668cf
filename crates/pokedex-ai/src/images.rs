//! Loading labelled training images from disk.
//!
//! A training directory holds one subdirectory per class, named after a
//! species (`bulbasaur/`) or a bare class id (`3/`). Images are decoded up
//! front into an in-memory list that is handed straight to the extractor.

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::DynamicImage;
use pokedex_core::{ClassId, parse_class_dir};
use tracing::{debug, info, warn};

/// File extensions treated as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif"];

/// A decoded image and the class it trains.
#[derive(Debug, Clone)]
pub struct LabeledImage {
    pub class_id: ClassId,
    pub source: PathBuf,
    pub image: DynamicImage,
}

/// Read and decode one image file. Decoding runs on the blocking pool.
pub async fn load_image(path: &Path) -> anyhow::Result<DynamicImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let display = path.display().to_string();
    tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).with_context(|| format!("decoding {display}"))
    })
    .await?
}

/// Load every image under `root`, grouped by class directory.
///
/// Classes are returned in ascending class id order and files in name order,
/// so repeated runs produce the same example store.
pub async fn load_labeled_images(root: &Path) -> anyhow::Result<Vec<LabeledImage>> {
    let mut class_dirs: Vec<(ClassId, PathBuf)> = Vec::new();
    let mut entries = tokio::fs::read_dir(root)
        .await
        .with_context(|| format!("reading training directory {}", root.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match parse_class_dir(&name) {
            Some(class_id) => class_dirs.push((class_id, entry.path())),
            None => warn!(dir = %name, "skipping directory that names no class"),
        }
    }
    class_dirs.sort();

    let mut images = Vec::new();
    for (class_id, dir) in class_dirs {
        let files = image_files(&dir).await?;
        debug!(class_id, dir = %dir.display(), files = files.len(), "loading class images");
        for source in files {
            let image = load_image(&source).await?;
            images.push(LabeledImage {
                class_id,
                source,
                image,
            });
        }
    }

    info!(root = %root.display(), images = images.len(), "loaded training images");
    Ok(images)
}

async fn image_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("reading {}", dir.display()))?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && is_image(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
