//! I/O for classification label rasters
//!
//! Only single-band integer GeoTIFFs are supported: classification maps and
//! transition rasters. Continuous imagery never enters this pipeline.

mod native;

pub use native::{read_labels, read_labels_from_buffer, write_labels, write_labels_to_buffer};
