use rayon::prelude::*;
use viewfinder_image::{Image, ImageError, ImageSize};

/// Represents 2D padding with top, bottom, left, and right values (in pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding2D {
    /// Amount of padding to add on the top side.
    pub top: usize,
    /// Amount of padding to add on the bottom side.
    pub bottom: usize,
    /// Amount of padding to add on the left side.
    pub left: usize,
    /// Amount of padding to add on the right side.
    pub right: usize,
}

impl Padding2D {
    /// Computes the padding that places an image of `old_size` at `offset` inside `new_size`.
    ///
    /// Returns `None` if the image does not fit inside the new size at that offset.
    ///
    /// # Example
    /// ```rust
    /// use viewfinder_image::ImageSize;
    /// use viewfinder_imgproc::padding::Padding2D;
    ///
    /// let old_size = ImageSize { width: 4, height: 4 };
    /// let new_size = ImageSize { width: 8, height: 6 };
    /// let padding = Padding2D::from_offset(old_size, new_size, [3, 1]).unwrap();
    ///
    /// assert_eq!(padding, Padding2D { top: 1, bottom: 1, left: 3, right: 1 });
    /// ```
    pub fn from_offset(old_size: ImageSize, new_size: ImageSize, offset: [usize; 2]) -> Option<Self> {
        let [left, top] = offset;
        let right = new_size.width.checked_sub(old_size.width.checked_add(left)?)?;
        let bottom = new_size.height.checked_sub(old_size.height.checked_add(top)?)?;
        Some(Self {
            top,
            bottom,
            left,
            right,
        })
    }

    /// Validates that a new image size matches the size after applying this padding.
    pub fn validate_size(&self, old_size: ImageSize, new_size: ImageSize) -> bool {
        new_size.width == old_size.width + self.left + self.right
            && new_size.height == old_size.height + self.top + self.bottom
    }
}

/// Places an image onto a larger canvas filled with the default value of `T`.
///
/// For RGBA images the default (zero) fill makes the extension fully transparent.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `new_size` - The size of the canvas.
/// * `offset` - The `[x, y]` position of the source top-left corner on the canvas.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if the source does not fit on the canvas at
/// `offset`, or [`ImageError::AllocationFailed`] if the canvas cannot be allocated.
///
/// # Example
///
/// ```rust
/// use viewfinder_image::{Image, ImageSize};
/// use viewfinder_imgproc::padding::extend_canvas;
///
/// let src = Image::<u8, 1>::new(ImageSize { width: 2, height: 1 }, vec![7, 9]).unwrap();
/// let canvas = extend_canvas(&src, ImageSize { width: 3, height: 2 }, [1, 1]).unwrap();
///
/// assert_eq!(canvas.as_slice(), &[0, 0, 0, 0, 7, 9]);
/// ```
pub fn extend_canvas<T, const C: usize>(
    src: &Image<T, C>,
    new_size: ImageSize,
    offset: [usize; 2],
) -> Result<Image<T, C>, ImageError>
where
    T: Copy + Default + Send + Sync,
{
    let padding = Padding2D::from_offset(src.size(), new_size, offset).ok_or(
        ImageError::InvalidImageSize(src.cols(), src.rows(), new_size.width, new_size.height),
    )?;

    let mut canvas = Image::<T, C>::from_size_val(new_size, T::default())?;

    if src.cols() == 0 || src.rows() == 0 {
        return Ok(canvas);
    }

    let src_stride = src.cols() * C;
    let dst_stride = new_size.width * C;
    let left = padding.left * C;

    canvas
        .as_slice_mut()
        .par_chunks_exact_mut(dst_stride)
        .skip(padding.top)
        .zip(src.as_slice().par_chunks_exact(src_stride))
        .for_each(|(dst_row, src_row)| {
            dst_row[left..left + src_stride].copy_from_slice(src_row);
        });

    Ok(canvas)
}
