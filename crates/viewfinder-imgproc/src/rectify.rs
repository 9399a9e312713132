//! Cropping of a quadrilateral image region into an upright rectangle.
//!
//! The region usually comes from projecting a planar rectangle in 3D into a camera, so it
//! is an arbitrary quadrilateral that may extend beyond the image. The rectifier first
//! validates the quadrilateral against a [`CropStrictness`] policy, extends the image onto
//! a transparent canvas when a corner falls outside, and finally warps the region onto
//! the target rectangle. Areas sampled from outside the image come out fully transparent.

use std::borrow::Cow;

use viewfinder_image::{Image, ImageError, ImageSize};

use crate::{
    interpolation::InterpolationMode,
    padding::extend_canvas,
    parallel,
    quad::Quadrilateral2D,
    warp::{get_perspective_transform, warp_perspective},
};

/// Default length of the shortest side of a rectified output.
pub const DEFAULT_SHORTEST_SIDE: usize = 1080;

/// How much of the quadrilateral must overlap the image before cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CropStrictness {
    /// No check. The output may be fully transparent.
    Loose,
    /// The quadrilateral must touch the image. Parts of the output may be transparent.
    #[default]
    Normal,
    /// All four corners must lie inside the image.
    Strict,
}

/// The quadrilateral was rejected before any pixel work.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropValidationError {
    /// No corner is inside the image and no edge crosses the image border.
    #[error("The quadrilateral does not intersect the image")]
    NoIntersectionWithImage,

    /// At least one corner lies outside the image.
    #[error("The quadrilateral is not fully inside the image")]
    QuadrilateralNotFullyInside,
}

/// The crop failed while producing pixels.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CropExecutionError {
    /// An intermediate image could not be created.
    #[error("Failed to convert the image")]
    ImageConversionFailed(#[from] ImageError),

    /// The corners do not define an invertible perspective transform.
    #[error("The quadrilateral is degenerate")]
    DegenerateQuadrilateral,
}

/// An error type for the quadrilateral rectifier.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RectifyError {
    /// The strictness policy rejected the quadrilateral.
    #[error(transparent)]
    Validation(#[from] CropValidationError),

    /// The crop itself failed.
    #[error(transparent)]
    Execution(#[from] CropExecutionError),
}

/// Options of [`rectify_quadrilateral`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RectifyOptions {
    /// Interpolation used to resample the region.
    pub interpolation: InterpolationMode,
}

/// Check a quadrilateral against the image rectangle `[0, W) x [0, H)`.
///
/// * `Loose` accepts anything.
/// * `Normal` requires a corner inside the image or an edge crossing the image border.
/// * `Strict` requires all corners inside the image.
pub fn validate_quadrilateral(
    quad: &Quadrilateral2D,
    image_size: ImageSize,
    strictness: CropStrictness,
) -> Result<(), CropValidationError> {
    match strictness {
        CropStrictness::Loose => Ok(()),
        CropStrictness::Normal if !quad.intersects(image_size) => {
            Err(CropValidationError::NoIntersectionWithImage)
        }
        CropStrictness::Normal => Ok(()),
        CropStrictness::Strict if !quad.is_inside(image_size) => {
            Err(CropValidationError::QuadrilateralNotFullyInside)
        }
        CropStrictness::Strict => Ok(()),
    }
}

/// Size of an output with the aspect ratio of `width / height` and the given shortest side.
///
/// Used to turn the physical size of a viewfinder into a pixel size. Returns `None` if
/// either dimension is not a positive finite number.
///
/// # Example
///
/// ```
/// use viewfinder_image::ImageSize;
/// use viewfinder_imgproc::rectify::output_size_for_aspect;
///
/// let size = output_size_for_aspect(0.32, 0.18, 1080).unwrap();
/// assert_eq!(size, ImageSize { width: 1920, height: 1080 });
/// ```
pub fn output_size_for_aspect(width: f64, height: f64, shortest_side: usize) -> Option<ImageSize> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return None;
    }

    let short = shortest_side as f64;
    let size = if width < height {
        ImageSize {
            width: shortest_side,
            height: (short * height / width).round().max(1.0) as usize,
        }
    } else {
        ImageSize {
            width: (short * width / height).round().max(1.0) as usize,
            height: shortest_side,
        }
    };

    Some(size)
}

/// Crop a quadrilateral region of an RGBA image and rectify it into a `target` sized image.
///
/// The corners top-left, top-right, bottom-right and bottom-left are mapped onto
/// `(0, 0)`, `(W, 0)`, `(W, H)` and `(0, H)` of the output. Output pixels sampled from
/// outside of the source are fully transparent. Interpolation is done on premultiplied
/// alpha so that transparent borders do not bleed color.
///
/// # Arguments
///
/// * `src` - The source RGBA image with straight alpha.
/// * `quad` - The region to crop, in source pixel coordinates.
/// * `strictness` - The validation policy.
/// * `target` - The size of the output.
/// * `options` - Interpolation of the warp.
///
/// # Returns
///
/// An RGBA image of exactly `target` size.
///
/// # Errors
///
/// [`RectifyError::Validation`] if the policy rejects the quadrilateral, and
/// [`RectifyError::Execution`] if the crop cannot be computed.
pub fn rectify_quadrilateral(
    src: &Image<u8, 4>,
    quad: &Quadrilateral2D,
    strictness: CropStrictness,
    target: ImageSize,
    options: &RectifyOptions,
) -> Result<Image<u8, 4>, RectifyError> {
    if let Err(err) = validate_quadrilateral(quad, src.size(), strictness) {
        log::debug!("quadrilateral {quad:?} rejected under {strictness:?}: {err}");
        return Err(err.into());
    }

    crop_and_warp(src, quad, target, options).map_err(|err| {
        log::error!("failed to crop quadrilateral {quad:?}: {err}");
        RectifyError::Execution(err)
    })
}

fn crop_and_warp(
    src: &Image<u8, 4>,
    quad: &Quadrilateral2D,
    target: ImageSize,
    options: &RectifyOptions,
) -> Result<Image<u8, 4>, CropExecutionError> {
    if target.width == 0 || target.height == 0 {
        return Err(ImageError::ZeroSize(target.width, target.height).into());
    }

    if quad.corners().iter().flatten().any(|v| !v.is_finite()) {
        return Err(CropExecutionError::DegenerateQuadrilateral);
    }

    let (canvas, quad) = extend_if_needed(src, quad)?;

    let corners = quad.corners();
    let (w, h) = (target.width as f64, target.height as f64);
    let dst_corners = [[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]];

    let m = get_perspective_transform(&corners, &dst_corners)
        .map_err(|_| CropExecutionError::DegenerateQuadrilateral)?;

    let canvas = premultiply(&canvas)?;
    let mut warped = Image::<f32, 4>::from_size_val(target, 0.0)?;

    warp_perspective(&canvas, &mut warped, &m, options.interpolation).map_err(|err| match err {
        ImageError::CannotComputeDeterminant => CropExecutionError::DegenerateQuadrilateral,
        err => err.into(),
    })?;

    Ok(unpremultiply(&warped)?)
}

// Transparent border kept around the image when the quadrilateral leaves it. Samples
// further out read nothing but transparent pixels, and the warp leaves destination
// pixels mapping outside of the canvas transparent already.
const CANVAS_MARGIN: f64 = 1.0;

// Places the image on a transparent canvas covering the quadrilateral, clipped to the
// image plus `CANVAS_MARGIN`, and moves the quadrilateral into canvas coordinates. Leaves
// both untouched when all corners are inside the image.
fn extend_if_needed<'a>(
    src: &'a Image<u8, 4>,
    quad: &Quadrilateral2D,
) -> Result<(Cow<'a, Image<u8, 4>>, Quadrilateral2D), ImageError> {
    let size = src.size();

    if quad.is_inside(size) {
        return Ok((Cow::Borrowed(src), *quad));
    }

    let (w, h) = (size.width as f64, size.height as f64);
    let bb = quad.bounding_box();
    let min_x = bb.min_x.floor().clamp(-CANVAS_MARGIN, 0.0);
    let min_y = bb.min_y.floor().clamp(-CANVAS_MARGIN, 0.0);
    let max_x = bb.max_x.ceil().clamp(w, w + CANVAS_MARGIN);
    let max_y = bb.max_y.ceil().clamp(h, h + CANVAS_MARGIN);

    let canvas_size = ImageSize {
        width: (max_x - min_x) as usize,
        height: (max_y - min_y) as usize,
    };
    let offset = [-min_x as usize, -min_y as usize];

    log::debug!("extending {size} onto a {canvas_size} canvas at offset {offset:?}");

    let canvas = extend_canvas(src, canvas_size, offset)?;

    Ok((Cow::Owned(canvas), quad.translated(-min_x, -min_y)))
}

fn premultiply(src: &Image<u8, 4>) -> Result<Image<f32, 4>, ImageError> {
    let mut dst = Image::<f32, 4>::from_size_val(src.size(), 0.0)?;
    parallel::par_iter_rows(src, &mut dst, |src_pixel, dst_pixel| {
        let alpha = src_pixel[3] as f32 / 255.0;
        for k in 0..3 {
            dst_pixel[k] = src_pixel[k] as f32 * alpha;
        }
        dst_pixel[3] = src_pixel[3] as f32;
    });
    Ok(dst)
}

fn unpremultiply(src: &Image<f32, 4>) -> Result<Image<u8, 4>, ImageError> {
    let mut dst = Image::<u8, 4>::from_size_val(src.size(), 0)?;
    parallel::par_iter_rows(src, &mut dst, |src_pixel, dst_pixel| {
        let alpha = src_pixel[3].round().clamp(0.0, 255.0);
        if alpha <= 0.0 {
            dst_pixel.fill(0);
            return;
        }
        let scale = 255.0 / src_pixel[3];
        for k in 0..3 {
            dst_pixel[k] = (src_pixel[k] * scale).round().clamp(0.0, 255.0) as u8;
        }
        dst_pixel[3] = alpha as u8;
    });
    Ok(dst)
}
