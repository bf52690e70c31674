//! True per-pixel ground area

use landshift_core::{Crs, GeoTransform};

/// WGS84 ellipsoid parameters
const WGS84_A: f64 = 6_378_137.0; // semi-major axis (m)
const WGS84_F: f64 = 1.0 / 298.257_223_563; // flattening

/// Ground area in m² of a cell at the given latitude on a geographic grid.
///
/// Uses the WGS84 radii of curvature: `dx = N·cos(φ)·Δλ`, `dy = M·Δφ`.
/// Cell area shrinks towards the poles; `pixel_size²` would overstate it.
pub fn spheroidal_cell_area_m2(latitude_deg: f64, d_lon_deg: f64, d_lat_deg: f64) -> f64 {
    let lat = latitude_deg.to_radians();
    let e2 = 2.0 * WGS84_F - WGS84_F * WGS84_F;

    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let w2 = 1.0 - e2 * sin_lat * sin_lat;

    // Prime vertical (N) and meridional (M) radii of curvature
    let n = WGS84_A / w2.sqrt();
    let m = WGS84_A * (1.0 - e2) / w2.powf(1.5);

    let dx = n * cos_lat * d_lon_deg.to_radians();
    let dy = m * d_lat_deg.to_radians();

    (dx * dy).abs()
}

/// Ground area in m² of the cells in a raster row.
///
/// Projected grids use the pixel footprint directly (coordinates are meters).
/// Geographic grids get the latitude-dependent spheroidal area, evaluated at
/// the row center — on north-up grids every cell of a row shares a latitude.
pub fn cell_area_m2(transform: &GeoTransform, crs: Option<&Crs>, row: usize) -> f64 {
    if crs.map(Crs::is_geographic).unwrap_or(false) {
        let (_, lat) = transform.pixel_to_geo(0, row);
        spheroidal_cell_area_m2(lat, transform.pixel_width, transform.pixel_height)
    } else {
        (transform.pixel_width * transform.pixel_height).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projected_cell_area() {
        let gt = GeoTransform::new(500_000.0, 4_650_000.0, 10.0, -10.0);
        let area = cell_area_m2(&gt, Some(&Crs::from_epsg(32633)), 0);
        assert_relative_eq!(area, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unknown_crs_treated_as_projected() {
        let gt = GeoTransform::new(0.0, 100.0, 30.0, -30.0);
        assert_relative_eq!(cell_area_m2(&gt, None, 5), 900.0, epsilon = 1e-9);
    }

    #[test]
    fn test_spheroidal_area_at_equator() {
        // 1"x1" (~30 m) cell at the equator
        let sec = 1.0 / 3600.0;
        let area = spheroidal_cell_area_m2(0.0, sec, sec);
        // dx ~ 30.92 m, dy ~ 30.72 m
        assert!((930.0..970.0).contains(&area), "got {} m²", area);
    }

    #[test]
    fn test_spheroidal_area_shrinks_with_latitude() {
        let sec = 1.0 / 3600.0;
        let equator = spheroidal_cell_area_m2(0.0, sec, sec);
        let mid = spheroidal_cell_area_m2(45.0, sec, sec);
        let high = spheroidal_cell_area_m2(70.0, sec, sec);
        assert!(equator > mid && mid > high);
        assert_relative_eq!(mid / equator, 45f64.to_radians().cos(), epsilon = 0.01);
    }

    #[test]
    fn test_geographic_row_latitude() {
        // Grid from 1°N going south at 0.5°/row: row 0 center at 0.75°N
        let gt = GeoTransform::new(10.0, 1.0, 0.5, -0.5);
        let crs = Crs::wgs84();
        let row0 = cell_area_m2(&gt, Some(&crs), 0);
        let row1 = cell_area_m2(&gt, Some(&crs), 1);
        // Row 1 center sits at 0.25°N, closer to the equator, so slightly larger
        assert!(row1 > row0);
    }
}
