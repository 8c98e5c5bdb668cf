//! Runtime configuration, loaded from an optional JSON file.
//!
//! Every field has a default, so an empty object `{}` is a valid config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PokedexConfig {
    pub classifier: ClassifierConfig,
    pub training: TrainingConfig,
    pub extractor: ExtractorConfig,
}

/// Similarity used to rank stored examples against a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Dot product of L2-normalized vectors.
    #[default]
    Cosine,
    /// Negated squared Euclidean distance.
    SquaredEuclidean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Neighbours consulted per prediction.
    pub k: usize,
    pub metric: Metric,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            k: 3,
            metric: Metric::Cosine,
        }
    }
}

/// Hardware class the training pass runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    #[default]
    Desktop,
    /// Memory-limited hardware such as phones; uses the tighter example cap.
    Constrained,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    pub device: DeviceProfile,
    /// Cap on examples per class on desktop hardware. `None` keeps everything.
    pub max_examples_per_class: Option<usize>,
    pub max_examples_per_class_on_constrained_device: usize,
    /// Images passed to the extractor per inference call.
    pub batch_size: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            device: DeviceProfile::Desktop,
            max_examples_per_class: None,
            max_examples_per_class_on_constrained_device: 50,
            batch_size: 16,
        }
    }
}

impl TrainingConfig {
    /// Per-class example cap for the configured device.
    pub fn example_limit(&self) -> Option<usize> {
        match self.device {
            DeviceProfile::Desktop => self.max_examples_per_class,
            DeviceProfile::Constrained => Some(self.max_examples_per_class_on_constrained_device),
        }
    }
}

/// Pixel scaling applied before the image reaches the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// `x / 127.5 - 1`, mapping channels to [-1, 1] (MobileNet).
    #[default]
    Symmetric,
    /// Per-channel ImageNet mean/std.
    ImageNet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Square input resolution expected by the network.
    pub image_size: u32,
    pub normalization: Normalization,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            image_size: 224,
            normalization: Normalization::Symmetric,
        }
    }
}

impl PokedexConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.classifier.k == 0 {
            return Err(ConfigError::Invalid("classifier.k must be at least 1".into()));
        }
        if self.training.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "training.batch_size must be at least 1".into(),
            ));
        }
        if self.extractor.image_size == 0 {
            return Err(ConfigError::Invalid(
                "extractor.image_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
