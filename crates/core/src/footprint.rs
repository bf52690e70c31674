//! Region-of-interest footprint geometry

use crate::crs::Crs;
use geo::{Area, BoundingRect, Contains, GeodesicArea};
use geo_types::{coord, MultiPolygon, Point, Polygon, Rect};

/// A region-of-interest polygon with the CRS it is expressed in.
///
/// The footprint bounds all area aggregation: a pixel contributes to an
/// area table iff its center lies inside the footprint geometry.
#[derive(Debug, Clone)]
pub struct Footprint {
    geometry: MultiPolygon<f64>,
    crs: Crs,
}

impl Footprint {
    /// Create a footprint from a multipolygon
    pub fn new(geometry: MultiPolygon<f64>, crs: Crs) -> Self {
        Self { geometry, crs }
    }

    /// Create a footprint from a single polygon
    pub fn from_polygon(polygon: Polygon<f64>, crs: Crs) -> Self {
        Self::new(MultiPolygon::new(vec![polygon]), crs)
    }

    /// Create a rectangular footprint from corner coordinates
    pub fn from_rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64, crs: Crs) -> Self {
        let rect = Rect::new(
            coord! { x: min_x, y: min_y },
            coord! { x: max_x, y: max_y },
        );
        Self::from_polygon(rect.to_polygon(), crs)
    }

    /// The footprint geometry
    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    /// The CRS the footprint coordinates are expressed in
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Ground area of the footprint in square meters.
    ///
    /// Geodesic on the WGS84 ellipsoid for geographic CRS; planar otherwise
    /// (planar coordinates are assumed to be meters, as in UTM).
    pub fn area_m2(&self) -> f64 {
        if self.crs.is_geographic() {
            self.geometry.geodesic_area_unsigned()
        } else {
            self.geometry.unsigned_area()
        }
    }

    /// Ground area of the footprint in square kilometers
    pub fn area_km2(&self) -> f64 {
        self.area_m2() / 1e6
    }

    /// Whether a point lies inside the footprint
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.geometry.contains(&Point::new(x, y))
    }

    /// Bounding rectangle of the footprint, if non-empty
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn utm_square(side: f64) -> Footprint {
        Footprint::from_rect(0.0, 0.0, side, side, Crs::from_epsg(32633))
    }

    #[test]
    fn test_planar_area() {
        let fp = utm_square(1000.0);
        assert_relative_eq!(fp.area_m2(), 1_000_000.0, epsilon = 1e-6);
        assert_relative_eq!(fp.area_km2(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_geodesic_area() {
        // 1°x1° cell at the equator is roughly 111.3 x 110.6 km
        let fp = Footprint::from_rect(0.0, 0.0, 1.0, 1.0, Crs::wgs84());
        let km2 = fp.area_km2();
        assert!((12_000.0..13_000.0).contains(&km2), "got {} km²", km2);
    }

    #[test]
    fn test_contains() {
        let fp = utm_square(10.0);
        assert!(fp.contains(5.0, 5.0));
        assert!(!fp.contains(15.0, 5.0));
    }

    #[test]
    fn test_bounding_rect() {
        let fp = utm_square(10.0);
        let rect = fp.bounding_rect().unwrap();
        assert_relative_eq!(rect.min().x, 0.0);
        assert_relative_eq!(rect.max().y, 10.0);
    }
}
