//! Pixel interpolation methods for image transformations.
//!
//! - **Nearest**: Fastest, uses nearest pixel value (no interpolation)
//! - **Bilinear**: Smooth linear interpolation between adjacent pixels

/// Grid generation and coordinate mapping utilities.
pub mod grid;

mod interpolate;

pub use interpolate::{interpolate_pixel, InterpolationMode};
