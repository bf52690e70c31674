//! Per-class area aggregation within a footprint

use crate::area::cell::cell_area_m2;
use crate::maybe_rayon::*;
use landshift_core::raster::Raster;
use landshift_core::{Error, Footprint, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Summed ground area per label, in km².
///
/// Ordered by label for deterministic iteration and printing. Labels with no
/// contributing pixel are omitted, not reported as zero. Merging two tables
/// sums areas key-wise — commutative and associative, so partial tables from
/// parallel workers can be combined in any order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaTable {
    areas: BTreeMap<i32, f64>,
}

impl AreaTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of labels with a recorded area
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Area in km² for a label, if any pixel carried it
    pub fn get(&self, label: i32) -> Option<f64> {
        self.areas.get(&label).copied()
    }

    /// Add area in km² to a label
    pub fn add(&mut self, label: i32, km2: f64) {
        *self.areas.entry(label).or_insert(0.0) += km2;
    }

    /// Merge another table into this one by key-wise summation
    pub fn merge(&mut self, other: AreaTable) {
        for (label, km2) in other.areas {
            self.add(label, km2);
        }
    }

    /// Iterate over (label, km²) in ascending label order
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.areas.iter().map(|(&label, &km2)| (label, km2))
    }

    /// Sum of all entries in km²
    pub fn total(&self) -> f64 {
        self.areas.values().sum()
    }
}

impl fmt::Display for AreaTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, km2) in self.iter() {
            writeln!(f, "{:>6}  {:>14.6} km²", label, km2)?;
        }
        Ok(())
    }
}

/// Sum the true ground area of each label inside a footprint, in km².
///
/// A pixel contributes iff its center lies inside the footprint and its value
/// is not no-data. Pixel area is area-correct per row (spheroidal on
/// geographic grids). A footprint that misses the raster entirely yields an
/// empty table. Fails if the raster and footprint carry non-equivalent CRS.
pub fn area_by_class(labels: &Raster<i32>, footprint: &Footprint) -> Result<AreaTable> {
    if let Some(crs) = labels.crs() {
        if !crs.is_equivalent(footprint.crs()) {
            return Err(Error::MisalignedRasters(format!(
                "raster CRS {} vs footprint CRS {}",
                crs.identifier(),
                footprint.crs().identifier()
            )));
        }
    }

    let (rows, cols) = labels.shape();

    // Each row owns its partial sums; the merge below is the only reduction.
    let partials: Vec<BTreeMap<i32, f64>> = (0..rows)
        .into_par_iter()
        .map(|row| {
            let mut acc: BTreeMap<i32, f64> = BTreeMap::new();
            let area_m2 = cell_area_m2(labels.transform(), labels.crs(), row);

            for col in 0..cols {
                let label = unsafe { labels.get_unchecked(row, col) };
                if labels.is_nodata(label) {
                    continue;
                }
                let (x, y) = labels.pixel_to_geo(col, row);
                if !footprint.contains(x, y) {
                    continue;
                }
                *acc.entry(label).or_insert(0.0) += area_m2;
            }
            acc
        })
        .collect();

    let mut table = AreaTable::new();
    for partial in partials {
        for (label, m2) in partial {
            table.add(label, m2 / 1e6);
        }
    }
    Ok(table)
}

/// Ground area of the footprint polygon itself, in km².
///
/// Independent of raster content; sanity check against the sum of class areas.
pub fn total_area_km2(footprint: &Footprint) -> f64 {
    footprint.area_km2()
}
