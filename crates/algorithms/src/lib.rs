//! # Landshift Algorithms
//!
//! Land-cover change analysis over categorical rasters:
//!
//! - **change**: transition codebook, transition raster encoding, change matrix
//! - **area**: true-ground-area aggregation per class and per transition
//! - **tiles**: tiled evaluation with retrying tile sources
//!
//! All computations are pure functions over immutable inputs. Alignment and
//! class-set validation happen before any pixel is touched.

pub mod area;
pub mod change;
pub mod tiles;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::area::{area_by_class, total_area_km2, AreaTable};
    pub use crate::change::{
        encode_transitions, pixel_transitions, ChangeMatrix, OutOfRange, PixelTransition,
        TransitionCodebook, TRANSITION_NODATA,
    };
    pub use crate::tiles::{
        area_by_class_tiled, tile_grid, InMemoryTileSource, RetryTileSource, Tile, TileSource,
    };
    pub use landshift_core::prelude::*;
}
