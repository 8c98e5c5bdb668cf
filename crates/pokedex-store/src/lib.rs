//! Dataset persistence: the record codec and the JSON dataset file.

pub mod codec;
mod error;
pub mod file;

pub use codec::{decode, encode, from_json, to_json};
pub use error::{FormatError, StoreError};
pub use file::{load, load_or_empty, save};
