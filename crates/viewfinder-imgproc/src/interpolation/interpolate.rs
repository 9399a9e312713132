use viewfinder_image::Image;

/// Interpolation mode for the resampling operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InterpolationMode {
    /// Bilinear interpolation
    #[default]
    Bilinear,
    /// Nearest neighbor interpolation
    Nearest,
}

/// Kernel for interpolating a pixel value
///
/// # Arguments
///
/// * `image` - The input image container with shape (height, width, C).
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `interpolation` - The interpolation mode to use.
///
/// # Returns
///
/// The interpolated pixel values.
///
/// PRECONDITION: `u` and `v` are within `[0, cols)` and `[0, rows)`.
pub fn interpolate_pixel<const C: usize>(
    image: &Image<f32, C>,
    u: f32,
    v: f32,
    interpolation: InterpolationMode,
) -> [f32; C] {
    match interpolation {
        InterpolationMode::Bilinear => bilinear(image, u, v),
        InterpolationMode::Nearest => nearest(image, u, v),
    }
}

// offset of the first channel of pixel (x, y)
#[inline]
fn offset<const C: usize>(image: &Image<f32, C>, x: usize, y: usize) -> usize {
    (y * image.cols() + x) * C
}

fn nearest<const C: usize>(image: &Image<f32, C>, u: f32, v: f32) -> [f32; C] {
    let x = (u.round() as usize).min(image.cols() - 1);
    let y = (v.round() as usize).min(image.rows() - 1);

    let start = offset(image, x, y);
    let mut pixel = [0.0; C];
    pixel.copy_from_slice(&image.as_slice()[start..start + C]);
    pixel
}

fn bilinear<const C: usize>(image: &Image<f32, C>, u: f32, v: f32) -> [f32; C] {
    let x0 = (u as usize).min(image.cols() - 1);
    let y0 = (v as usize).min(image.rows() - 1);
    // neighbours past the last row or column fall back to it
    let x1 = (x0 + 1).min(image.cols() - 1);
    let y1 = (y0 + 1).min(image.rows() - 1);

    let (du, dv) = (u.fract(), v.fract());
    let taps = [
        (offset(image, x0, y0), (1.0 - du) * (1.0 - dv)),
        (offset(image, x1, y0), du * (1.0 - dv)),
        (offset(image, x0, y1), (1.0 - du) * dv),
        (offset(image, x1, y1), du * dv),
    ];

    let data = image.as_slice();
    let mut pixel = [0.0; C];
    for (start, weight) in taps {
        for (acc, value) in pixel.iter_mut().zip(&data[start..start + C]) {
            *acc += value * weight;
        }
    }
    pixel
}
