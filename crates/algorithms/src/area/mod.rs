//! Area aggregation over categorical rasters
//!
//! - **cell**: true per-pixel ground area (planar or spheroidal)
//! - **zonal**: per-class area tables restricted to a footprint

mod cell;
mod zonal;

pub use cell::{cell_area_m2, spheroidal_cell_area_m2};
pub use zonal::{area_by_class, total_area_km2, AreaTable};
