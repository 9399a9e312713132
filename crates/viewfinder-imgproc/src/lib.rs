#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// utilities to draw on images.
pub mod draw;

/// utilities for interpolation.
pub mod interpolation;

/// operations to extend images onto a larger canvas.
pub mod padding;

/// module containing parallization utilities.
pub mod parallel;

/// quadrilaterals in pixel space.
pub mod quad;

/// quadrilateral cropping and perspective rectification.
pub mod rectify;

/// image geometric transformations module.
pub mod warp;
