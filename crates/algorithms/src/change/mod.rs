//! Land-cover change transition analysis
//!
//! - **codebook**: deterministic (from-class, to-class) → code bijection
//! - **encode**: per-pixel transition raster from two classification maps
//! - **pixels**: lazy iteration over labeled pixel pairs inside a footprint
//! - **summary**: n×n change matrix with per-class gains and losses

mod codebook;
mod encode;
mod pixels;
mod summary;

pub use codebook::TransitionCodebook;
pub use encode::{encode_transitions, OutOfRange, TRANSITION_NODATA};
pub use pixels::{pixel_transitions, PixelTransition};
pub use summary::ChangeMatrix;
