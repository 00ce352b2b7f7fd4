pub mod constants;
pub mod layout;
pub mod loader;
mod manifest;
mod options;
mod pairs;
mod preview;
pub mod sequence;
mod stats;
pub mod transform;
mod types;

use thiserror::Error;

pub use layout::{Placement, place, resolve};
pub use loader::{DecodedImage, load};
pub use manifest::{load_manifest, parse_manifest};
pub use options::*;
pub use pairs::PairCollection;
pub use preview::{PREVIEW_THUMBNAIL, TILE_THUMBNAIL, generate_thumbnail, thumbnail};
pub use sequence::{MirrorSource, PageContent, PageEntry, sequence};
pub use stats::{PairStatistics, calculate_statistics};
pub use transform::{PositionMap, TransformKey, TransformRegistry};
pub use types::*;

/// A structural operation addressed a pair that does not exist
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Pair position {position} is out of range (collection has {len} pairs)")]
pub struct IndexError {
    pub position: usize,
    pub len: usize,
}

/// An image could not be read or decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to load image {reference}: {reason}")]
pub struct ImageLoadError {
    pub reference: ImageRef,
    pub reason: String,
}

impl ImageLoadError {
    pub fn new(reference: &ImageRef, reason: impl Into<String>) -> Self {
        Self {
            reference: reference.clone(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum DuplexError {
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    ImageLoad(#[from] ImageLoadError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Manifest line {line}: {message}")]
    Manifest { line: u64, message: String },
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DuplexError>;
