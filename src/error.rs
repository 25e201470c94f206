// Error type for the whole program.
// Every variant states *where* things went wrong, and whether the caller can
// still carry on with a fallback grid.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::grid::GridError;

#[derive(Debug, Error)]
pub enum Error {
    /// Height-map file absent or unreadable. Recoverable: use the default grid.
    #[error("cannot read height map {}: {source}", .path.display())]
    MissingResource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Height-map file readable but not a rectangular numeric grid.
    #[error("malformed height map {}: {source}", .path.display())]
    MalformedGrid {
        path: PathBuf,
        #[source]
        source: GridError,
    },

    /// Image could not be opened or decoded.
    #[error("cannot decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image target size must be non-zero, got {width}x{height}")]
    InvalidImageTarget { width: u32, height: u32 },

    #[error("cannot write height map {}: {source}", .path.display())]
    WriteGrid {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The two grids of a morph pair differ in shape (rows, columns).
    #[error("height maps differ in shape: {}x{} vs {}x{}", .left.0, .left.1, .right.0, .right.1)]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("cannot read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("window init error: {0}")]
    WindowInit(String),

    #[error("window update error: {0}")]
    WindowUpdate(String),
}

impl Error {
    /// True for load failures where substituting the default grid is allowed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::MissingResource { .. } | Error::MalformedGrid { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
