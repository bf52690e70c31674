//! Coordinate Reference System handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate reference system representation.
///
/// EPSG-first: most classification products carry an EPSG code in their
/// GeoTIFF keys. A WKT string is kept as a fallback identifier only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    /// EPSG code if known
    epsg: Option<u32>,
    /// WKT representation if available
    wkt: Option<String>,
}

impl Crs {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            epsg: Some(code),
            wkt: None,
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            epsg: None,
            wkt: Some(wkt.into()),
        }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get WKT representation
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Whether coordinates are degrees of longitude/latitude.
    ///
    /// Drives the pixel-area model: geographic grids need spheroidal cell
    /// areas, projected grids use the pixel footprint directly.
    pub fn is_geographic(&self) -> bool {
        if let Some(code) = self.epsg {
            // EPSG reserves the 4000-4999 block for geodetic lon/lat systems
            // (4326 WGS84, 4269 NAD83, 4283 GDA94, 4674 SIRGAS 2000, ...).
            // A handful of projected world CRS were later slotted into the
            // block and must not pick up the spheroidal area model.
            return matches!(code, 4000..=4999) && !matches!(code, 4037 | 4038 | 4087 | 4088);
        }
        if let Some(wkt) = &self.wkt {
            return wkt.trim_start().starts_with("GEOGCS")
                || wkt.trim_start().starts_with("GEOGCRS");
        }
        false
    }

    /// Check if two CRS are equivalent
    pub fn is_equivalent(&self, other: &Crs) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }
        false
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(wkt) = &self.wkt {
            // Truncate on a char boundary; WKT names may hold non-ASCII
            let prefix: String = wkt.chars().take(50).collect();
            return format!("WKT:{}", prefix);
        }
        "unknown".to_string()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geographic_detection() {
        assert!(Crs::wgs84().is_geographic());
        assert!(!Crs::from_epsg(32633).is_geographic());
        assert!(Crs::from_wkt("GEOGCS[\"WGS 84\"...]").is_geographic());
        assert!(!Crs::from_wkt("PROJCS[\"UTM 33N\"...]").is_geographic());
    }

    #[test]
    fn test_geographic_detection_beyond_wgs84_family() {
        // National geodetic datums: GDA94, SIRGAS 2000, CGCS2000
        for code in [4283, 4674, 4490] {
            assert!(Crs::from_epsg(code).is_geographic(), "EPSG:{}", code);
        }
        // Projected systems inside and outside the 4xxx block
        for code in [4087, 4088, 3857, 32755] {
            assert!(!Crs::from_epsg(code).is_geographic(), "EPSG:{}", code);
        }
    }

    #[test]
    fn test_equivalence() {
        assert!(Crs::from_epsg(4326).is_equivalent(&Crs::wgs84()));
        assert!(!Crs::from_epsg(4326).is_equivalent(&Crs::from_epsg(3857)));
    }

    #[test]
    fn test_identifier() {
        assert_eq!(Crs::from_epsg(32633).identifier(), "EPSG:32633");
    }

    #[test]
    fn test_identifier_truncates_non_ascii_wkt() {
        // Multi-byte chars straddling the truncation point must not panic
        let wkt = format!("GEOGCS[\"{}é étendu\"]", "x".repeat(41));
        let id = Crs::from_wkt(wkt).identifier();
        assert!(id.starts_with("WKT:GEOGCS"));
        assert_eq!(id.chars().count(), "WKT:".chars().count() + 50);
    }
}
