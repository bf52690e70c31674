//! Error types for landshift

use thiserror::Error;

/// Main error type for landshift operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid class set: {0}")]
    InvalidClassSet(String),

    #[error("Misaligned rasters: {0}")]
    MisalignedRasters(String),

    #[error("Label {label} at ({row}, {col}) is not in the class set")]
    OutOfRangeLabel {
        label: i32,
        row: usize,
        col: usize,
    },

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Transient tile read failure: {0}")]
    TileReadTransient(String),

    #[error("Tile read failed after {attempts} attempts: {reason}")]
    TileReadExhausted { attempts: u32, reason: String },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether a retry may succeed for this error
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::TileReadTransient(_))
    }
}

/// Result type alias for landshift operations
pub type Result<T> = std::result::Result<T, Error>;
