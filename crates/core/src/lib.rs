//! # Landshift Core
//!
//! Core types and I/O for the landshift land-cover change toolkit.
//!
//! This crate provides:
//! - `Raster<T>`: Generic georeferenced raster grid
//! - `GeoTransform`: Affine transformation for georeferencing
//! - `Crs`: Coordinate reference system handling
//! - `Footprint`: Region-of-interest polygon with area and containment queries
//! - Native GeoTIFF I/O for single-band label rasters

pub mod crs;
pub mod error;
pub mod footprint;
pub mod io;
pub mod raster;

pub use crs::Crs;
pub use error::{Error, Result};
pub use footprint::Footprint;
pub use raster::{GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::footprint::Footprint;
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
}
