//! Transition raster encoding

use crate::change::TransitionCodebook;
use crate::maybe_rayon::*;
use landshift_core::raster::Raster;
use landshift_core::{Error, Result};
use ndarray::Array2;

/// No-data value of transition rasters.
///
/// Negative on purpose: it can never collide with a transition code, all of
/// which live in `[0, n²)`.
pub const TRANSITION_NODATA: i32 = -1;

/// Policy for pixels whose label is missing from the class set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutOfRange {
    /// Mask the pixel to no-data in the transition raster
    #[default]
    Exclude,
    /// Abort the whole computation with [`Error::OutOfRangeLabel`]
    Fail,
}

/// Encode two classification rasters into a transition raster.
///
/// Each valid pixel receives the code of its `(before, after)` label pair
/// from the codebook. One lookup per pixel guarantees exactly one code per
/// pixel; there is no mask overlap to go wrong. Pixels that are no-data in
/// either input, or whose label is outside the class set, are handled by
/// `policy` — under [`OutOfRange::Exclude`] they become [`TRANSITION_NODATA`].
///
/// Inputs must be aligned (same shape, geotransform and CRS); misalignment
/// aborts before any pixel is read.
///
/// # Arguments
/// * `before` - Classification at the start year
/// * `after` - Classification at the end year
/// * `codebook` - Transition codebook over the valid classes
/// * `policy` - Out-of-range label policy
pub fn encode_transitions(
    before: &Raster<i32>,
    after: &Raster<i32>,
    codebook: &TransitionCodebook,
    policy: OutOfRange,
) -> Result<Raster<i32>> {
    before.aligned_with(after)?;
    let (rows, cols) = before.shape();

    let row_data: Vec<Vec<i32>> = (0..rows)
        .into_par_iter()
        .map(|row| -> Result<Vec<i32>> {
            let mut out = vec![TRANSITION_NODATA; cols];
            for (col, cell) in out.iter_mut().enumerate() {
                let b = unsafe { before.get_unchecked(row, col) };
                let a = unsafe { after.get_unchecked(row, col) };

                if before.is_nodata(b) || after.is_nodata(a) {
                    continue;
                }

                match codebook.code(b, a) {
                    Some(code) => *cell = code,
                    None if policy == OutOfRange::Fail => {
                        let label = if codebook.contains(b) { a } else { b };
                        return Err(Error::OutOfRangeLabel { label, row, col });
                    }
                    None => {}
                }
            }
            Ok(out)
        })
        .collect::<Result<Vec<_>>>()?;

    let data: Vec<i32> = row_data.into_iter().flatten().collect();

    let mut output = before.with_same_meta::<i32>(rows, cols);
    output.set_nodata(Some(TRANSITION_NODATA));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}
