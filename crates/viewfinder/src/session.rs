use std::sync::{Arc, PoisonError, RwLock};

use glam::DVec2;
use viewfinder_3d::{
    model::{RawCalibration, StereoCalibration},
    projector::Quadrilateral3D,
};

use crate::{
    capture::{capture_stereo, StereoPhoto},
    config::CaptureConfig,
    error::CaptureError,
    frame::LatestFrame,
};

/// A capture session owning the shared stereo calibration.
///
/// The calibration is immutable and handed out as `Arc`, so captures running on other
/// threads keep the calibration they started with even if the session is restarted.
#[derive(Debug, Default)]
pub struct CaptureSession {
    config: CaptureConfig,
    calibration: RwLock<Option<Arc<StereoCalibration>>>,
}

impl CaptureSession {
    /// Create a session that has not been started yet.
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            calibration: RwLock::new(None),
        }
    }

    /// The capture configuration.
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Validate the raw calibration and make it the calibration of the session.
    ///
    /// Replaces the calibration of a running session.
    pub fn start(&self, raw: &RawCalibration) -> Result<Arc<StereoCalibration>, CaptureError> {
        let calibration = Arc::new(StereoCalibration::new(raw, &self.config.tolerance)?);

        let previous = self
            .calibration
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(calibration.clone());

        if let Some(previous) = previous {
            log::info!(
                "calibration replaced, views moved by {:.3e}",
                previous.max_view_difference(&calibration)
            );
        }

        Ok(calibration)
    }

    /// Rebuild the calibration of a running session, e.g. after the cameras changed.
    ///
    /// On failure the previous calibration stays in place.
    pub fn restart(&self, raw: &RawCalibration) -> Result<Arc<StereoCalibration>, CaptureError> {
        if !self.is_started() {
            return Err(CaptureError::SessionNotStarted);
        }
        self.start(raw).map_err(|err| {
            log::warn!("keeping the previous calibration: {err}");
            err
        })
    }

    /// Drop the calibration.
    pub fn stop(&self) {
        *self
            .calibration
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether the session has a calibration.
    pub fn is_started(&self) -> bool {
        self.calibration
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The current calibration.
    pub fn calibration(&self) -> Result<Arc<StereoCalibration>, CaptureError> {
        self.calibration
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CaptureError::SessionNotStarted)
    }

    /// Capture the viewfinder from the most recent frame.
    ///
    /// # Errors
    ///
    /// [`CaptureError::SessionNotStarted`] without calibration,
    /// [`CaptureError::FrameNotReady`] if no frame has been published yet, and the errors
    /// of [`capture_stereo`].
    pub fn capture(
        &self,
        latest: &LatestFrame,
        viewfinder: &Quadrilateral3D,
        viewfinder_size: DVec2,
    ) -> Result<StereoPhoto, CaptureError> {
        let calibration = self.calibration()?;
        let frame = latest.snapshot().ok_or(CaptureError::FrameNotReady)?;
        capture_stereo(
            &calibration,
            &frame,
            viewfinder,
            viewfinder_size,
            &self.config,
        )
    }
}
