use viewfinder_image::Image;

use crate::quad::Quadrilateral2D;

// writes the color only when (x, y) lies on the image
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x < 0 || y < 0 || x >= img.cols() as i64 || y >= img.rows() as i64 {
        return;
    }
    let start = (y as usize * img.cols() + x as usize) * C;
    if let Some(pixel) = img.as_slice_mut().get_mut(start..start + C) {
        pixel.copy_from_slice(&color);
    }
}

// Liang-Barsky clipping of the segment p0 -> p1 against [lo, x_hi] x [lo, y_hi].
// Works in f64 so that far away endpoints neither overflow nor get walked.
fn clip_segment(
    p0: (i64, i64),
    p1: (i64, i64),
    lo: f64,
    x_hi: f64,
    y_hi: f64,
) -> Option<((i64, i64), (i64, i64))> {
    let (x0, y0) = (p0.0 as f64, p0.1 as f64);
    let (dx, dy) = (p1.0 as f64 - x0, p1.1 as f64 - y0);

    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [(-dx, x0 - lo), (dx, x_hi - x0), (-dy, y0 - lo), (dy, y_hi - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    // clamping absorbs the rounding of far away endpoints
    let at = |t: f64| {
        (
            (x0 + t * dx).round().clamp(lo, x_hi) as i64,
            (y0 + t * dy).round().clamp(lo, y_hi) as i64,
        )
    };
    Some((at(t0), at(t1)))
}

/// Draws a line on an image inplace using Bresenham's line algorithm.
///
/// The line is clipped to the image first, so endpoints far outside of it cost nothing.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
/// * `thickness` - The thickness of the line, approximated by a square brush.
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    if img.cols() == 0 || img.rows() == 0 {
        return;
    }

    let half = if thickness > 1 {
        thickness as i64 / 2
    } else {
        0
    };

    // keep the part whose brush can still touch the image
    let Some(((mut x0, mut y0), (x1, y1))) = clip_segment(
        p0,
        p1,
        -(half as f64),
        (img.cols() as i64 - 1 + half) as f64,
        (img.rows() as i64 - 1 + half) as f64,
    ) else {
        return;
    };

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();

    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    loop {
        for i in -half..=half {
            for j in -half..=half {
                set_pixel(img, x0 + i, y0 + j, color);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draws a polyline through `points`, closing it back to the first point if `closed` is set.
pub fn draw_polyline<const C: usize>(
    img: &mut Image<u8, C>,
    points: &[(i64, i64)],
    closed: bool,
    color: [u8; C],
    thickness: usize,
) {
    for pair in points.windows(2) {
        draw_line(img, pair[0], pair[1], color, thickness);
    }

    if closed && points.len() > 2 {
        if let (Some(&last), Some(&first)) = (points.last(), points.first()) {
            draw_line(img, last, first, color, thickness);
        }
    }
}

/// Strokes the outline of a quadrilateral onto an image, as a debug overlay.
///
/// Corners are rounded to the nearest pixel. Parts of the outline outside the image
/// are skipped, so projected quadrilaterals can be drawn without clipping them first.
pub fn draw_quadrilateral<const C: usize>(
    img: &mut Image<u8, C>,
    quad: &Quadrilateral2D,
    color: [u8; C],
    thickness: usize,
) {
    let points = quad
        .corners()
        .map(|[x, y]| (x.round() as i64, y.round() as i64));
    draw_polyline(img, &points, true, color, thickness);
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewfinder_image::{ImageError, ImageSize};

    #[test]
    fn draw_line_horizontal() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 5,
                height: 3,
            },
            0,
        )?;

        draw_line(&mut img, (0, 1), (4, 1), [255], 1);

        #[rustfmt::skip]
        assert_eq!(
            img.as_slice(),
            &[
                0, 0, 0, 0, 0,
                255, 255, 255, 255, 255,
                0, 0, 0, 0, 0,
            ]
        );

        Ok(())
    }

    #[test]
    fn draw_line_clipped() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 3,
            },
            0,
        )?;

        draw_line(&mut img, (-5, -5), (10, 10), [1], 1);

        #[rustfmt::skip]
        assert_eq!(
            img.as_slice(),
            &[
                1, 0, 0,
                0, 1, 0,
                0, 0, 1,
            ]
        );

        Ok(())
    }

    #[test]
    fn draw_line_far_outside_endpoints() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 5,
                height: 3,
            },
            0,
        )?;

        // walking these endpoints pixel by pixel would take billions of steps
        draw_line(&mut img, (-4_000_000_000, 1), (4_000_000_000, 1), [7], 1);
        draw_line(&mut img, (2, -3_000_000_000), (2, 5_000_000_000), [9], 1);
        draw_line(&mut img, (100_000, 100_000), (200_000, -100_000), [3], 3);

        #[rustfmt::skip]
        assert_eq!(
            img.as_slice(),
            &[
                0, 0, 9, 0, 0,
                7, 7, 9, 7, 7,
                0, 0, 9, 0, 0,
            ]
        );

        Ok(())
    }

    #[test]
    fn draw_quadrilateral_with_corners_near_infinity() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            0,
        )?;

        let quad = Quadrilateral2D {
            top_left: [1.0, 1.0],
            top_right: [1.0e12, 1.0],
            bottom_left: [1.0, 1.0e12],
            bottom_right: [1.0e12, 1.0e12],
        };
        draw_quadrilateral(&mut img, &quad, [1], 1);

        #[rustfmt::skip]
        assert_eq!(
            img.as_slice(),
            &[
                0, 0, 0, 0,
                0, 1, 1, 1,
                0, 1, 0, 0,
                0, 1, 0, 0,
            ]
        );

        Ok(())
    }

    #[test]
    fn draw_quadrilateral_outline() -> Result<(), ImageError> {
        let mut img = Image::<u8, 4>::from_size_val(
            ImageSize {
                width: 6,
                height: 5,
            },
            0,
        )?;

        let quad = Quadrilateral2D::from_rect(1.0, 1.0, 4.0, 3.0);
        draw_quadrilateral(&mut img, &quad, [255, 0, 0, 255], 1);

        for y in 0..5 {
            for x in 0..6 {
                let on_outline =
                    ((x == 1 || x == 4) && (1..=3).contains(&y)) || ((y == 1 || y == 3) && (1..=4).contains(&x));
                let expected = if on_outline { 255 } else { 0 };
                assert_eq!(*img.get_pixel(x, y, 0)?, expected, "pixel ({x}, {y})");
                assert_eq!(*img.get_pixel(x, y, 1)?, 0);
            }
        }

        Ok(())
    }
}
