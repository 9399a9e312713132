use crate::{
    interpolation::{grid::meshgrid_from_fn, interpolate_pixel, InterpolationMode},
    parallel,
};

use viewfinder_image::{Image, ImageError};

// below this magnitude a determinant is treated as zero
const SINGULAR_EPS: f64 = 1e-12;

#[rustfmt::skip]
fn determinant3x3(m: &[f64; 9]) -> f64 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) -
    m[1] * (m[3] * m[8] - m[5] * m[6]) +
    m[2] * (m[3] * m[7] - m[4] * m[6])
}

#[rustfmt::skip]
fn adjugate3x3(m: &[f64; 9]) -> [f64; 9] {
    [
        m[4] * m[8] - m[5] * m[7],  // [0, 0]
        m[2] * m[7] - m[1] * m[8],  // [0, 1]
        m[1] * m[5] - m[2] * m[4],  // [0, 2]
        m[5] * m[6] - m[3] * m[8],  // [1, 0]
        m[0] * m[8] - m[2] * m[6],  // [1, 1]
        m[2] * m[3] - m[0] * m[5],  // [1, 2]
        m[3] * m[7] - m[4] * m[6],  // [2, 0]
        m[1] * m[6] - m[0] * m[7],  // [2, 1]
        m[0] * m[4] - m[1] * m[3],  // [2, 2]
    ]
}

#[rustfmt::skip]
fn matmul3x3(a: &[f64; 9], b: &[f64; 9]) -> [f64; 9] {
    let mut c = [0.0; 9];
    for i in 0..3 {
        for j in 0..3 {
            c[i * 3 + j] = a[i * 3] * b[j] + a[i * 3 + 1] * b[3 + j] + a[i * 3 + 2] * b[6 + j];
        }
    }
    c
}

/// Invert a 3x3 perspective transformation matrix in row-major order.
///
/// # Errors
///
/// Returns [`ImageError::CannotComputeDeterminant`] if the matrix is singular.
pub fn invert_perspective_transform(m: &[f64; 9]) -> Result<[f64; 9], ImageError> {
    let det = determinant3x3(m);

    if !det.is_finite() || det.abs() < SINGULAR_EPS {
        return Err(ImageError::CannotComputeDeterminant);
    }

    let adj = adjugate3x3(m);
    let inv_det = 1.0 / det;

    let mut inv_m = [0.0; 9];
    for i in 0..9 {
        inv_m[i] = adj[i] * inv_det;
    }

    Ok(inv_m)
}

/// Apply a 3x3 perspective transformation to a point.
pub fn transform_point(x: f64, y: f64, m: &[f64; 9]) -> (f64, f64) {
    let w = m[6] * x + m[7] * y + m[8];
    let xt = (m[0] * x + m[1] * y + m[2]) / w;
    let yt = (m[3] * x + m[4] * y + m[5]) / w;
    (xt, yt)
}

// Projective map sending the unit square corners (0,0) (1,0) (1,1) (0,1) to
// the four points given in the same cyclic order.
fn unit_square_to_quad(q: &[[f64; 2]; 4]) -> Result<[f64; 9], ImageError> {
    let [[x0, y0], [x1, y1], [x2, y2], [x3, y3]] = *q;

    let dx3 = x0 - x1 + x2 - x3;
    let dy3 = y0 - y1 + y2 - y3;

    let m = if dx3.abs() < SINGULAR_EPS && dy3.abs() < SINGULAR_EPS {
        // parallelogram, the map is affine
        [x1 - x0, x2 - x1, x0, y1 - y0, y2 - y1, y0, 0.0, 0.0, 1.0]
    } else {
        let (dx1, dx2) = (x1 - x2, x3 - x2);
        let (dy1, dy2) = (y1 - y2, y3 - y2);

        let den = dx1 * dy2 - dx2 * dy1;
        if den.abs() < SINGULAR_EPS {
            return Err(ImageError::CannotComputeDeterminant);
        }

        let g = (dx3 * dy2 - dx2 * dy3) / den;
        let h = (dx1 * dy3 - dx3 * dy1) / den;

        [
            x1 - x0 + g * x1,
            x3 - x0 + h * x3,
            x0,
            y1 - y0 + g * y1,
            y3 - y0 + h * y3,
            y0,
            g,
            h,
            1.0,
        ]
    };

    if determinant3x3(&m).abs() < SINGULAR_EPS {
        return Err(ImageError::CannotComputeDeterminant);
    }

    Ok(m)
}

/// Compute the perspective transformation mapping four source points onto four destination points.
///
/// The points are expected in the same cyclic order in both arrays, e.g. top-left,
/// top-right, bottom-right, bottom-left. The transform is computed in closed form by
/// composing the unit square to destination map with the inverse of the unit square
/// to source map.
///
/// # Arguments
///
/// * `src` - The four source points `[x, y]`.
/// * `dst` - The four destination points `[x, y]`.
///
/// # Returns
///
/// The 3x3 perspective transformation matrix src -> dst in row-major order, normalized
/// so that the last element is one.
///
/// # Errors
///
/// Returns [`ImageError::CannotComputeDeterminant`] if three of the points are collinear.
pub fn get_perspective_transform(
    src: &[[f64; 2]; 4],
    dst: &[[f64; 2]; 4],
) -> Result<[f64; 9], ImageError> {
    let square_to_src = unit_square_to_quad(src)?;
    let square_to_dst = unit_square_to_quad(dst)?;

    let src_to_square = invert_perspective_transform(&square_to_src)?;
    let mut m = matmul3x3(&square_to_dst, &src_to_square);

    if m[8].abs() > SINGULAR_EPS {
        let scale = 1.0 / m[8];
        m.iter_mut().for_each(|v| *v *= scale);
    }

    if m.iter().any(|v| !v.is_finite()) {
        return Err(ImageError::CannotComputeDeterminant);
    }

    Ok(m)
}

/// Applies a perspective transformation to an image.
///
/// Destination pixels whose source position falls outside of `src` are left untouched,
/// so initializing `dst` with zeros keeps them transparent for images with alpha.
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output image with shape (height, width, channels).
/// * `m` - The 3x3 perspective transformation matrix src -> dst.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use viewfinder_image::{Image, ImageSize};
/// use viewfinder_imgproc::interpolation::InterpolationMode;
/// use viewfinder_imgproc::warp::warp_perspective;
///
/// let src = Image::<f32, 1>::new(
///   ImageSize {
///     width: 4,
///     height: 5,
///   },
///   vec![0.0f32; 4 * 5]
/// ).unwrap();
///
/// let m = [1.0, 0.0, -1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
///
/// let mut dst = Image::<f32, 1>::from_size_val(
///   ImageSize {
///     width: 2,
///     height: 3,
///   },
///   0.0
/// ).unwrap();
///
/// warp_perspective(&src, &mut dst, &m, InterpolationMode::Bilinear).unwrap();
///
/// assert_eq!(dst.size().width, 2);
/// assert_eq!(dst.size().height, 3);
/// ```
pub fn warp_perspective<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    m: &[f64; 9],
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    let inv_m = invert_perspective_transform(m)?;

    // find the position in src of every dst pixel
    let (dst_rows, dst_cols) = (dst.rows(), dst.cols());
    let (map_x, map_y) = meshgrid_from_fn(dst_cols, dst_rows, |x, y| {
        let (xsrc, ysrc) = transform_point(x as f64, y as f64, &inv_m);
        (xsrc as f32, ysrc as f32)
    })?;

    let (src_cols, src_rows) = (src.cols() as f32, src.rows() as f32);

    parallel::par_iter_rows_resample(dst, &map_x, &map_y, |&x, &y, dst_pixel| {
        if x >= 0.0f32 && x < src_cols && y >= 0.0f32 && y < src_rows {
            dst_pixel.copy_from_slice(&interpolate_pixel(src, x, y, interpolation));
        }
    });

    Ok(())
}
