use glam::DVec2;
use viewfinder_3d::{
    model::{CameraModel, Eye, StereoCalibration},
    projector::{Projector, Quadrilateral3D},
};
use viewfinder_image::{Image, ImageSize};
use viewfinder_imgproc::{
    quad::Quadrilateral2D,
    rectify::{output_size_for_aspect, rectify_quadrilateral},
};

use crate::{
    config::CaptureConfig,
    error::{CaptureError, EyeCaptureError},
    frame::StereoFrame,
};

/// The rectified viewfinder content seen by both cameras.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoPhoto {
    /// The photo of the left camera.
    pub left: Image<u8, 4>,
    /// The photo of the right camera.
    pub right: Image<u8, 4>,
}

impl StereoPhoto {
    /// The photo of an eye.
    pub fn image(&self, eye: Eye) -> &Image<u8, 4> {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }
}

/// Crop what a 3D viewfinder frames out of both camera frames.
///
/// The cameras are placed at the device transform of the frame, the viewfinder corners
/// are projected into each camera and the projected region is rectified into a photo
/// with the aspect ratio of the viewfinder. Both eyes are processed in parallel.
///
/// # Arguments
///
/// * `calibration` - The validated stereo calibration of the session.
/// * `frame` - The camera frames and device transform of this capture.
/// * `viewfinder` - The viewfinder corners in world space.
/// * `viewfinder_size` - The physical width and height of the viewfinder.
/// * `config` - The capture configuration.
///
/// # Errors
///
/// [`CaptureError::InvalidViewfinderSize`] if the size is not positive, otherwise
/// [`CaptureError::Eye`] for the first eye that failed.
pub fn capture_stereo(
    calibration: &StereoCalibration,
    frame: &StereoFrame,
    viewfinder: &Quadrilateral3D,
    viewfinder_size: DVec2,
    config: &CaptureConfig,
) -> Result<StereoPhoto, CaptureError> {
    let target = output_size_for_aspect(viewfinder_size.x, viewfinder_size.y, config.shortest_side)
        .filter(|size| size.width > 0 && size.height > 0)
        .ok_or(CaptureError::InvalidViewfinderSize {
            width: viewfinder_size.x,
            height: viewfinder_size.y,
        })?;

    let model = calibration.locate(&frame.device_transform);

    let (left, right) = rayon::join(
        || capture_eye(&model, Eye::Left, frame, viewfinder, target, config),
        || capture_eye(&model, Eye::Right, frame, viewfinder, target, config),
    );

    let photo = StereoPhoto {
        left: left.map_err(|source| CaptureError::Eye {
            eye: Eye::Left,
            source,
        })?,
        right: right.map_err(|source| CaptureError::Eye {
            eye: Eye::Right,
            source,
        })?,
    };

    log::info!("captured a stereo photo of {target}");

    Ok(photo)
}

/// Project the viewfinder into one eye as a pixel quadrilateral.
pub fn project_viewfinder(
    model: &CameraModel,
    eye: Eye,
    viewfinder: &Quadrilateral3D,
) -> Result<Quadrilateral2D, EyeCaptureError> {
    let [tl, tr, bl, br] = Projector::new(model, eye).project_quadrilateral(viewfinder)?;
    Ok(Quadrilateral2D {
        top_left: tl.to_array(),
        top_right: tr.to_array(),
        bottom_left: bl.to_array(),
        bottom_right: br.to_array(),
    })
}

fn capture_eye(
    model: &CameraModel,
    eye: Eye,
    frame: &StereoFrame,
    viewfinder: &Quadrilateral3D,
    target: ImageSize,
    config: &CaptureConfig,
) -> Result<Image<u8, 4>, EyeCaptureError> {
    let image = frame.image(eye);

    if image.size() != model.resolution() {
        return Err(EyeCaptureError::FrameSizeMismatch {
            expected: model.resolution(),
            actual: image.size(),
        });
    }

    let quad = project_viewfinder(model, eye, viewfinder)?;
    log::debug!("{eye} eye sees the viewfinder at {quad:?}");

    Ok(rectify_quadrilateral(
        image,
        &quad,
        config.strictness,
        target,
        &config.rectify,
    )?)
}
