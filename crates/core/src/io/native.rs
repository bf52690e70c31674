//! Native GeoTIFF reading/writing for label rasters
//!
//! Uses the `tiff` crate directly. Handles the GeoTIFF tags the change
//! pipeline needs: pixel scale, tiepoint, the geokey directory (EPSG code)
//! and the GDAL no-data tag. Anything fancier belongs to an external tool.

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::GrayI32;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const KEY_MODEL_TYPE: u32 = 1024;
const KEY_RASTER_TYPE: u32 = 1025;
const KEY_GEOGRAPHIC_TYPE: u32 = 2048;
const KEY_PROJECTED_CS_TYPE: u32 = 3072;

/// Read a single-band integer GeoTIFF into a label raster.
///
/// Floating-point TIFFs are rejected: class labels are categorical and a
/// float band almost always means the wrong input file.
pub fn read_labels<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_labels(file)
}

/// Read a label raster from an in-memory GeoTIFF buffer
pub fn read_labels_from_buffer<T>(data: &[u8]) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_labels(Cursor::new(data))
}

fn decode_labels<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match result {
        DecodingResult::U8(buf) => cast_buffer(&buf),
        DecodingResult::U16(buf) => cast_buffer(&buf),
        DecodingResult::U32(buf) => cast_buffer(&buf),
        DecodingResult::I8(buf) => cast_buffer(&buf),
        DecodingResult::I16(buf) => cast_buffer(&buf),
        DecodingResult::I32(buf) => cast_buffer(&buf),
        DecodingResult::F32(_) | DecodingResult::F64(_) => {
            return Err(Error::UnsupportedDataType(
                "floating-point band is not a label raster".to_string(),
            ))
        }
        _ => {
            return Err(Error::UnsupportedDataType(
                "unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Ok(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_crs(read_crs(&mut decoder));
    raster.set_nodata(read_nodata(&mut decoder));

    Ok(raster)
}

fn cast_buffer<S, T>(buf: &[S]) -> Vec<T>
where
    S: Copy + num_traits::NumCast,
    T: RasterElement,
{
    buf.iter()
        .map(|&v| num_traits::cast(v).unwrap_or_else(T::default_nodata))
        .collect()
}

/// Geotransform from ModelPixelScaleTag + ModelTiepointTag
fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::Other("No pixel scale tag".into()))?;

    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::Other("No tiepoint tag".into()))?;

    if scale.len() >= 2 && tiepoint.len() >= 6 {
        // tiepoint: [I, J, K, X, Y, Z]; scale: [ScaleX, ScaleY, ScaleZ]
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        return Ok(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
    }

    Err(Error::Other("Cannot determine geotransform".into()))
}

/// EPSG code from the geokey directory, if present
fn read_crs<R: std::io::Read + std::io::Seek>(decoder: &mut Decoder<R>) -> Option<Crs> {
    let keys = decoder
        .get_tag_u32_vec(Tag::GeoKeyDirectoryTag)
        .ok()?;

    // Header is [version, revision, minor, key count]; entries are
    // [key id, tag location, count, value].
    for entry in keys.get(4..)?.chunks_exact(4) {
        let (id, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 {
            continue;
        }
        if id == KEY_PROJECTED_CS_TYPE || id == KEY_GEOGRAPHIC_TYPE {
            return Some(Crs::from_epsg(value));
        }
    }
    None
}

/// No-data value from the GDAL_NODATA ascii tag
fn read_nodata<R: std::io::Read + std::io::Seek, T: RasterElement>(
    decoder: &mut Decoder<R>,
) -> Option<T> {
    let text = decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()?;
    let value: f64 = text.trim().trim_end_matches('\0').parse().ok()?;
    num_traits::cast(value)
}

/// Write a label raster to a GeoTIFF file as signed 32-bit integers
pub fn write_labels<P: AsRef<Path>>(raster: &Raster<i32>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    encode_labels(raster, BufWriter::new(file))
}

/// Write a label raster to an in-memory GeoTIFF buffer
pub fn write_labels_to_buffer(raster: &Raster<i32>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_labels(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_labels<W>(raster: &Raster<i32>, writer: W) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let data: Vec<i32> = raster.data().iter().copied().collect();

    let mut image = encoder
        .new_image::<GrayI32>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let gt = raster.transform();

    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &scale[..])
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {}", e)))?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {}", e)))?;

    let geokeys = build_geokeys(raster.crs());
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, geokeys.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {}", e)))?;

    if let Some(nd) = raster.nodata() {
        image
            .encoder()
            .write_tag(Tag::GdalNodata, nd.to_string().as_str())
            .map_err(|e| Error::Other(format!("Cannot write nodata tag: {}", e)))?;
    }

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}

/// Minimal geokey directory: model type, raster type and the EPSG code
fn build_geokeys(crs: Option<&Crs>) -> Vec<u16> {
    let geographic = crs.map(Crs::is_geographic).unwrap_or(false);
    let model_type: u16 = if geographic { 2 } else { 1 };

    let mut entries: Vec<[u16; 4]> = vec![
        [KEY_MODEL_TYPE as u16, 0, 1, model_type],
        [KEY_RASTER_TYPE as u16, 0, 1, 1], // RasterPixelIsArea
    ];

    if let Some(code) = crs.and_then(Crs::epsg) {
        if code <= u16::MAX as u32 {
            let key = if geographic {
                KEY_GEOGRAPHIC_TYPE
            } else {
                KEY_PROJECTED_CS_TYPE
            };
            entries.push([key as u16, 0, 1, code as u16]);
        }
    }

    let mut keys: Vec<u16> = vec![1, 1, 0, entries.len() as u16];
    for entry in entries {
        keys.extend_from_slice(&entry);
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raster() -> Raster<i32> {
        let mut r = Raster::from_vec(vec![0, 1, 2, 3, 4, 0], 2, 3).unwrap();
        r.set_transform(GeoTransform::new(500_000.0, 4_650_000.0, 10.0, -10.0));
        r.set_crs(Some(Crs::from_epsg(32633)));
        r.set_nodata(Some(-1));
        r
    }

    #[test]
    fn test_write_read_roundtrip() {
        let raster = sample_raster();
        let buf = write_labels_to_buffer(&raster).unwrap();
        let back: Raster<i32> = read_labels_from_buffer(&buf).unwrap();

        assert_eq!(back.shape(), (2, 3));
        assert_eq!(back.get(0, 0).unwrap(), 0);
        assert_eq!(back.get(1, 1).unwrap(), 4);
        assert_eq!(back.transform(), raster.transform());
        assert_eq!(back.crs().and_then(Crs::epsg), Some(32633));
        assert_eq!(back.nodata(), Some(-1));
    }

    #[test]
    fn test_geographic_geokeys() {
        let mut raster = sample_raster();
        raster.set_transform(GeoTransform::new(11.0, 47.0, 0.001, -0.001));
        raster.set_crs(Some(Crs::wgs84()));

        let buf = write_labels_to_buffer(&raster).unwrap();
        let back: Raster<i32> = read_labels_from_buffer(&buf).unwrap();

        let crs = back.crs().unwrap();
        assert_eq!(crs.epsg(), Some(4326));
        assert!(crs.is_geographic());
    }

    #[test]
    fn test_read_garbage_fails() {
        let result: Result<Raster<i32>> = read_labels_from_buffer(&[0u8; 16]);
        assert!(result.is_err());
    }
}
