//! Lazy iteration over labeled pixel pairs

use crate::area::cell_area_m2;
use landshift_core::raster::Raster;
use landshift_core::{Footprint, Result};

/// One pixel observed in both classification years
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelTransition {
    pub row: usize,
    pub col: usize,
    /// Label in the start year
    pub from: i32,
    /// Label in the end year
    pub to: i32,
    /// True ground area of the pixel in m²
    pub area_m2: f64,
}

/// Iterate lazily over pixels inside the footprint that carry a valid label
/// in both years.
///
/// Alignment is checked up front; after that the iterator allocates nothing.
/// No-data pixels in either raster and pixels whose center falls outside the
/// footprint are skipped.
pub fn pixel_transitions<'a>(
    before: &'a Raster<i32>,
    after: &'a Raster<i32>,
    footprint: &'a Footprint,
) -> Result<impl Iterator<Item = PixelTransition> + 'a> {
    before.aligned_with(after)?;
    let (rows, cols) = before.shape();

    let iter = (0..rows).flat_map(move |row| {
        let area_m2 = cell_area_m2(before.transform(), before.crs(), row);
        (0..cols).filter_map(move |col| {
            let from = unsafe { before.get_unchecked(row, col) };
            let to = unsafe { after.get_unchecked(row, col) };

            if before.is_nodata(from) || after.is_nodata(to) {
                return None;
            }
            let (x, y) = before.pixel_to_geo(col, row);
            if !footprint.contains(x, y) {
                return None;
            }
            Some(PixelTransition {
                row,
                col,
                from,
                to,
                area_m2,
            })
        })
    });

    Ok(iter)
}
