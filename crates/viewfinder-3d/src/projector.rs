use glam::{DMat4, DVec2, DVec3};

use crate::{
    error::ProjectionError,
    intrinsics::PinholeIntrinsics,
    model::{CameraModel, Eye},
};

/// A planar quadrilateral in world space, e.g. the corners of a viewfinder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral3D {
    /// The top-left corner.
    pub top_left: DVec3,
    /// The top-right corner.
    pub top_right: DVec3,
    /// The bottom-left corner.
    pub bottom_left: DVec3,
    /// The bottom-right corner.
    pub bottom_right: DVec3,
}

impl Quadrilateral3D {
    /// The corners in the order top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self) -> [DVec3; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Physical width and height, averaged over opposite edges.
    pub fn size(&self) -> DVec2 {
        let width = (self.top_left.distance(self.top_right)
            + self.bottom_left.distance(self.bottom_right))
            * 0.5;
        let height = (self.top_left.distance(self.bottom_left)
            + self.top_right.distance(self.bottom_right))
            * 0.5;
        DVec2::new(width, height)
    }
}

/// Projects world points into the pixels of one camera.
///
/// Caches the world to camera transform and the pinhole parameters, so repeated
/// projections into the same eye skip the matrix inversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    world_to_camera: DMat4,
    pinhole: PinholeIntrinsics,
    height: f64,
}

impl Projector {
    /// Create a projector for one eye of a camera model.
    pub fn new(model: &CameraModel, eye: Eye) -> Self {
        let resolution = model.resolution();
        Self {
            world_to_camera: model.pose(eye).inverse(),
            pinhole: model.intrinsics().pinhole(resolution),
            height: resolution.height as f64,
        }
    }

    /// Project a world point to pixel coordinates with the origin at the top-left corner and
    /// y pointing down.
    ///
    /// Points outside of the field of view are projected without clamping, so the result
    /// may be negative or exceed the resolution.
    ///
    /// # Errors
    ///
    /// [`ProjectionError::PointBehindCamera`] if the point is not strictly in front of the
    /// camera, which looks down its `-z` axis.
    pub fn project(&self, point: DVec3) -> Result<DVec2, ProjectionError> {
        let p = self.world_to_camera.transform_point3(point);

        if !(p.z < 0.0) {
            return Err(ProjectionError::PointBehindCamera { depth: p.z });
        }

        let nx = p.x / -p.z;
        let ny = p.y / -p.z;

        let PinholeIntrinsics { fx, fy, cx, cy } = self.pinhole;
        let px = nx * fx + cx;
        let py = ny * fy + cy;

        // camera y points up, image y points down
        Ok(DVec2::new(px, self.height - py))
    }

    /// Project the four corners of a quadrilateral, in the order top-left, top-right,
    /// bottom-left, bottom-right.
    ///
    /// Fails as a whole if any corner fails.
    pub fn project_quadrilateral(
        &self,
        quad: &Quadrilateral3D,
    ) -> Result<[DVec2; 4], ProjectionError> {
        let [tl, tr, bl, br] = quad.corners();
        Ok([
            self.project(tl)?,
            self.project(tr)?,
            self.project(bl)?,
            self.project(br)?,
        ])
    }
}

/// Project a world point into the pixels of one eye.
///
/// See [`Projector::project`].
pub fn project_point(
    model: &CameraModel,
    eye: Eye,
    point: DVec3,
) -> Result<DVec2, ProjectionError> {
    Projector::new(model, eye).project(point)
}

/// Project the corners of a world quadrilateral into the pixels of one eye.
///
/// See [`Projector::project_quadrilateral`].
pub fn project_quadrilateral(
    model: &CameraModel,
    eye: Eye,
    quad: &Quadrilateral3D,
) -> Result<[DVec2; 4], ProjectionError> {
    Projector::new(model, eye)
        .project_quadrilateral(quad)
        .map_err(|err| {
            log::debug!("cannot project quadrilateral into the {eye} eye: {err}");
            err
        })
}
