use std::sync::{Arc, Mutex, PoisonError};

use glam::DMat4;
use viewfinder_3d::Eye;
use viewfinder_image::Image;

/// A pair of camera frames and the device pose at the time they were taken.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoFrame {
    /// The left camera frame, RGBA with straight alpha.
    pub left: Image<u8, 4>,
    /// The right camera frame, RGBA with straight alpha.
    pub right: Image<u8, 4>,
    /// The device to world transform when the frames were taken.
    pub device_transform: DMat4,
}

impl StereoFrame {
    /// The frame of an eye.
    pub fn image(&self, eye: Eye) -> &Image<u8, 4> {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }
}

/// Holds the most recent stereo frame, overwriting the previous one.
///
/// Cloning gives another handle to the same slot, so the frame source and the capture
/// can live on different threads.
#[derive(Debug, Clone, Default)]
pub struct LatestFrame {
    slot: Arc<Mutex<Option<Arc<StereoFrame>>>>,
}

impl LatestFrame {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored frame.
    pub fn publish(&self, frame: StereoFrame) {
        // a poisoned slot still holds a complete frame
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(frame));
    }

    /// The most recent frame, if any has been published.
    pub fn snapshot(&self) -> Option<Arc<StereoFrame>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the stored frame.
    pub fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
