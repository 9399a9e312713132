//! Geometric image transformations using perspective warps.
//!
//! - Perspective transform estimation from four point correspondences
//! - Perspective transformations (homographies) applied to images
//!
//! # Examples
//!
//! Mapping a quadrilateral onto a rectangle:
//!
//! ```
//! use viewfinder_imgproc::warp::{get_perspective_transform, transform_point};
//!
//! let src = [[10.0, 10.0], [90.0, 20.0], [80.0, 70.0], [20.0, 60.0]];
//! let dst = [[0.0, 0.0], [64.0, 0.0], [64.0, 48.0], [0.0, 48.0]];
//!
//! let m = get_perspective_transform(&src, &dst).unwrap();
//! let (x, y) = transform_point(90.0, 20.0, &m);
//! assert!((x - 64.0).abs() < 1e-9 && y.abs() < 1e-9);
//! ```

mod perspective;

pub use perspective::{
    get_perspective_transform, invert_perspective_transform, transform_point, warp_perspective,
};
