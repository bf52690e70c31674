//! Tiled evaluation over a backing tile store
//!
//! Large classifications do not always fit in memory: the area aggregation
//! can instead stream tiles from a [`TileSource`]. Reading a tile is the only
//! suspend point of the computation; transient read failures are retried with
//! bounded exponential backoff. Each tile's partial table is merged into the
//! final result by key-wise summation.

use crate::area::{area_by_class, AreaTable};
use crate::maybe_rayon::*;
use landshift_core::raster::Raster;
use landshift_core::{Error, Footprint, GeoTransform, Result};
use ndarray::s;
use std::time::Duration;

/// A rectangular window into a source raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Row offset in the source raster
    pub row_offset: usize,
    /// Column offset in the source raster
    pub col_offset: usize,
    /// Number of rows in this tile
    pub rows: usize,
    /// Number of columns in this tile
    pub cols: usize,
}

impl Tile {
    /// Create a new tile
    pub fn new(row_offset: usize, col_offset: usize, rows: usize, cols: usize) -> Self {
        Self {
            row_offset,
            col_offset,
            rows,
            cols,
        }
    }
}

/// Cover a rows×cols raster with non-overlapping tiles
pub fn tile_grid(rows: usize, cols: usize, tile_rows: usize, tile_cols: usize) -> Vec<Tile> {
    let mut tiles = Vec::new();
    let mut row = 0;
    while row < rows {
        let trows = tile_rows.min(rows - row);
        let mut col = 0;
        while col < cols {
            let tcols = tile_cols.min(cols - col);
            tiles.push(Tile::new(row, col, trows, tcols));
            col += tile_cols;
        }
        row += tile_rows;
    }
    tiles
}

/// A backing store that hands out label raster tiles.
///
/// Implementations must return tiles georeferenced in the source grid, so
/// that footprint containment and cell areas stay correct.
pub trait TileSource: Sync {
    fn read_tile(&self, tile: &Tile) -> Result<Raster<i32>>;
}

/// Tile source over a raster already held in memory
#[derive(Debug, Clone)]
pub struct InMemoryTileSource {
    raster: Raster<i32>,
}

impl InMemoryTileSource {
    pub fn new(raster: Raster<i32>) -> Self {
        Self { raster }
    }

    /// Shape of the backing raster as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.raster.shape()
    }
}

impl TileSource for InMemoryTileSource {
    fn read_tile(&self, tile: &Tile) -> Result<Raster<i32>> {
        let (rows, cols) = self.raster.shape();
        if tile.row_offset + tile.rows > rows || tile.col_offset + tile.cols > cols {
            return Err(Error::IndexOutOfBounds {
                row: tile.row_offset + tile.rows,
                col: tile.col_offset + tile.cols,
                rows,
                cols,
            });
        }

        let window = self.raster.data().slice(s![
            tile.row_offset..tile.row_offset + tile.rows,
            tile.col_offset..tile.col_offset + tile.cols
        ]);
        let mut out = Raster::from_vec(window.iter().copied().collect(), tile.rows, tile.cols)?;

        let tf = self.raster.transform();
        let (origin_x, origin_y) = tf.pixel_to_geo_corner(tile.col_offset, tile.row_offset);
        out.set_transform(GeoTransform::new(
            origin_x,
            origin_y,
            tf.pixel_width,
            tf.pixel_height,
        ));
        out.set_crs(self.raster.crs().cloned());
        out.set_nodata(self.raster.nodata());

        Ok(out)
    }
}

/// Wrapper that retries transient tile read failures.
///
/// Backoff doubles per attempt starting from `base_backoff`. Non-transient
/// errors propagate immediately; exhausted retries surface as
/// [`Error::TileReadExhausted`].
pub struct RetryTileSource<S> {
    inner: S,
    max_retries: u32,
    base_backoff: Duration,
}

impl<S: TileSource> RetryTileSource<S> {
    pub fn new(inner: S, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries,
            base_backoff: Duration::from_millis(100),
        }
    }

    /// Override the first backoff delay (doubled on each further attempt)
    pub fn with_base_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }
}

impl<S: TileSource> TileSource for RetryTileSource<S> {
    fn read_tile(&self, tile: &Tile) -> Result<Raster<i32>> {
        let mut last_reason = String::new();

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                std::thread::sleep(self.base_backoff * 2u32.pow(attempt - 1));
            }
            match self.inner.read_tile(tile) {
                Ok(raster) => return Ok(raster),
                Err(e) if e.is_transient() => last_reason = e.to_string(),
                Err(e) => return Err(e),
            }
        }

        Err(Error::TileReadExhausted {
            attempts: self.max_retries + 1,
            reason: last_reason,
        })
    }
}

/// Per-class area aggregation streamed over tiles.
///
/// Workers own their tiles exclusively and produce partial tables; the final
/// merge sums areas per label, so tile order does not matter. Any tile read
/// failure (after retries, if the source retries) fails the whole computation
/// — there is no partial-result contract.
pub fn area_by_class_tiled<S: TileSource>(
    source: &S,
    tiles: &[Tile],
    footprint: &Footprint,
) -> Result<AreaTable> {
    let partials: Vec<AreaTable> = tiles
        .into_par_iter()
        .map(|tile| {
            let raster = source.read_tile(tile)?;
            area_by_class(&raster, footprint)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut table = AreaTable::new();
    for partial in partials {
        table.merge(partial);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use landshift_core::Crs;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn utm_labels(rows: usize, cols: usize) -> Raster<i32> {
        let values: Vec<i32> = (0..rows * cols).map(|i| (i % 5) as i32).collect();
        let mut r = Raster::from_vec(values, rows, cols).unwrap();
        r.set_transform(GeoTransform::new(0.0, rows as f64 * 10.0, 10.0, -10.0));
        r.set_crs(Some(Crs::from_epsg(32633)));
        r
    }

    fn covering_footprint(raster: &Raster<i32>) -> Footprint {
        let (min_x, min_y, max_x, max_y) = raster.bounds();
        Footprint::from_rect(min_x, min_y, max_x, max_y, Crs::from_epsg(32633))
    }

    /// Fails transiently `failures` times, then delegates
    struct FlakySource {
        inner: InMemoryTileSource,
        failures: AtomicU32,
    }

    impl TileSource for FlakySource {
        fn read_tile(&self, tile: &Tile) -> Result<Raster<i32>> {
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |f| f.checked_sub(1))
                .is_ok()
            {
                return Err(Error::TileReadTransient("store unavailable".into()));
            }
            self.inner.read_tile(tile)
        }
    }

    #[test]
    fn test_tile_grid_covers_exactly() {
        let tiles = tile_grid(10, 7, 4, 3);
        let cells: usize = tiles.iter().map(|t| t.rows * t.cols).sum();
        assert_eq!(cells, 70);
        // Ragged edge tiles are clipped
        assert!(tiles.iter().all(|t| t.row_offset + t.rows <= 10));
        assert!(tiles.iter().all(|t| t.col_offset + t.cols <= 7));
    }

    #[test]
    fn test_tiled_matches_whole_raster() {
        let raster = utm_labels(20, 20);
        let fp = covering_footprint(&raster);

        let whole = area_by_class(&raster, &fp).unwrap();

        let source = InMemoryTileSource::new(raster);
        let tiles = tile_grid(20, 20, 7, 6);
        let tiled = area_by_class_tiled(&source, &tiles, &fp).unwrap();

        assert_eq!(whole.len(), tiled.len());
        for (label, km2) in whole.iter() {
            assert_relative_eq!(tiled.get(label).unwrap(), km2, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_out_of_bounds_tile_rejected() {
        let source = InMemoryTileSource::new(utm_labels(10, 10));
        let result = source.read_tile(&Tile::new(8, 8, 4, 4));
        assert!(matches!(result, Err(Error::IndexOutOfBounds { .. })));
    }

    #[test]
    fn test_retry_recovers_from_transient_failures() {
        let source = RetryTileSource::new(
            FlakySource {
                inner: InMemoryTileSource::new(utm_labels(10, 10)),
                failures: AtomicU32::new(2),
            },
            3,
        )
        .with_base_backoff(Duration::ZERO);

        let tile = Tile::new(0, 0, 10, 10);
        assert!(source.read_tile(&tile).is_ok());
    }

    #[test]
    fn test_retry_exhaustion_is_fatal() {
        let source = RetryTileSource::new(
            FlakySource {
                inner: InMemoryTileSource::new(utm_labels(10, 10)),
                failures: AtomicU32::new(100),
            },
            2,
        )
        .with_base_backoff(Duration::ZERO);

        let result = source.read_tile(&Tile::new(0, 0, 10, 10));
        match result {
            Err(Error::TileReadExhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected TileReadExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_non_transient_error_not_retried() {
        let source = RetryTileSource::new(InMemoryTileSource::new(utm_labels(10, 10)), 5)
            .with_base_backoff(Duration::from_secs(60));

        // Out-of-bounds is not transient: fails immediately, no backoff sleep
        let result = source.read_tile(&Tile::new(9, 9, 5, 5));
        assert!(matches!(result, Err(Error::IndexOutOfBounds { .. })));
    }
}
