//! The species the bundled dataset is trained on, and their class ids.
//!
//! Training images are organised in directories named after a species
//! (`bulbasaur/`, `charmander/`, `squirtle/`) or after a bare class id
//! (`3/`), so [`parse_class_dir`] accepts both.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ClassId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Bulbasaur,
    Charmander,
    Squirtle,
}

impl Species {
    pub const ALL: [Species; 3] = [Self::Bulbasaur, Self::Charmander, Self::Squirtle];

    pub fn class_id(self) -> ClassId {
        match self {
            Self::Bulbasaur => 0,
            Self::Charmander => 1,
            Self::Squirtle => 2,
        }
    }

    pub fn from_class_id(class_id: ClassId) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.class_id() == class_id)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bulbasaur => "Bulbasaur",
            Self::Charmander => "Charmander",
            Self::Squirtle => "Squirtle",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown species: {0}")]
pub struct UnknownSpecies(pub String);

impl FromStr for Species {
    type Err = UnknownSpecies;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|sp| sp.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownSpecies(name.to_string()))
    }
}

/// Human-readable label for a class id: the species name, or `class <id>`.
pub fn class_label(class_id: ClassId) -> String {
    match Species::from_class_id(class_id) {
        Some(species) => species.name().to_string(),
        None => format!("class {class_id}"),
    }
}

/// Resolve a training directory name to a class id.
///
/// Accepts a species name in any case or a non-negative integer.
pub fn parse_class_dir(name: &str) -> Option<ClassId> {
    if let Ok(species) = name.parse::<Species>() {
        return Some(species.class_id());
    }
    name.trim().parse::<ClassId>().ok()
}
