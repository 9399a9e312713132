use viewfinder_image::ImageSize;

/// An axis aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// The smallest x coordinate.
    pub min_x: f64,
    /// The smallest y coordinate.
    pub min_y: f64,
    /// The largest x coordinate.
    pub max_x: f64,
    /// The largest y coordinate.
    pub max_y: f64,
}

impl BoundingBox {
    /// The width of the box.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// The height of the box.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// A quadrilateral in pixel space, top-left origin with y pointing down.
///
/// The corners usually come from projecting a planar rectangle in 3D, so the shape is
/// in general not a rectangle. Coordinates may be negative or exceed the image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral2D {
    /// The top-left corner `[x, y]`.
    pub top_left: [f64; 2],
    /// The top-right corner `[x, y]`.
    pub top_right: [f64; 2],
    /// The bottom-left corner `[x, y]`.
    pub bottom_left: [f64; 2],
    /// The bottom-right corner `[x, y]`.
    pub bottom_right: [f64; 2],
}

impl Quadrilateral2D {
    /// Create a quadrilateral covering the axis aligned rectangle `[x0, x1] x [y0, y1]`.
    pub fn from_rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            top_left: [x0, y0],
            top_right: [x1, y0],
            bottom_left: [x0, y1],
            bottom_right: [x1, y1],
        }
    }

    /// The corners in cyclic order: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [[f64; 2]; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// The four edges tl→tr, tr→br, br→bl and bl→tl.
    pub fn edges(&self) -> [([f64; 2], [f64; 2]); 4] {
        let [tl, tr, br, bl] = self.corners();
        [(tl, tr), (tr, br), (br, bl), (bl, tl)]
    }

    /// Whether any corner is inside the image rectangle `[0, W) x [0, H)`.
    pub fn contains_point(&self, size: ImageSize) -> bool {
        self.corners().iter().any(|&p| point_in_image(p, size))
    }

    /// Whether all four corners are inside the image rectangle `[0, W) x [0, H)`.
    pub fn is_inside(&self, size: ImageSize) -> bool {
        self.corners().iter().all(|&p| point_in_image(p, size))
    }

    /// Whether the quadrilateral touches the image.
    ///
    /// True if a corner lies inside the image or one of the quadrilateral edges crosses
    /// one of the image border edges. Parallel edges never count as crossing.
    pub fn intersects(&self, size: ImageSize) -> bool {
        if self.contains_point(size) {
            return true;
        }

        let (w, h) = (size.width as f64, size.height as f64);
        let image_edges = Self::from_rect(0.0, 0.0, w, h).edges();

        self.edges().iter().any(|&(p1, p2)| {
            image_edges
                .iter()
                .any(|&(p3, p4)| segments_intersect(p1, p2, p3, p4))
        })
    }

    /// The axis aligned bounding box of the corners.
    pub fn bounding_box(&self) -> BoundingBox {
        let corners = self.corners();
        corners.iter().skip(1).fold(
            BoundingBox {
                min_x: corners[0][0],
                min_y: corners[0][1],
                max_x: corners[0][0],
                max_y: corners[0][1],
            },
            |b, p| BoundingBox {
                min_x: b.min_x.min(p[0]),
                min_y: b.min_y.min(p[1]),
                max_x: b.max_x.max(p[0]),
                max_y: b.max_y.max(p[1]),
            },
        )
    }

    /// The quadrilateral moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let t = |p: [f64; 2]| [p[0] + dx, p[1] + dy];
        Self {
            top_left: t(self.top_left),
            top_right: t(self.top_right),
            bottom_left: t(self.bottom_left),
            bottom_right: t(self.bottom_right),
        }
    }
}

// Half-open in y-down pixel coordinates. A y-up containment test maps to (0, H] here,
// which only differs on the first and last rows.
fn point_in_image(p: [f64; 2], size: ImageSize) -> bool {
    p[0] >= 0.0 && p[0] < size.width as f64 && p[1] >= 0.0 && p[1] < size.height as f64
}

// segment p1-p2 against segment p3-p4
fn segments_intersect(p1: [f64; 2], p2: [f64; 2], p3: [f64; 2], p4: [f64; 2]) -> bool {
    let den = (p4[1] - p3[1]) * (p2[0] - p1[0]) - (p4[0] - p3[0]) * (p2[1] - p1[1]);

    if den == 0.0 {
        return false;
    }

    let ua = ((p4[0] - p3[0]) * (p1[1] - p3[1]) - (p4[1] - p3[1]) * (p1[0] - p3[0])) / den;
    let ub = ((p2[0] - p1[0]) * (p1[1] - p3[1]) - (p2[1] - p1[1]) * (p1[0] - p3[0])) / den;

    (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HD: ImageSize = ImageSize {
        width: 1920,
        height: 1080,
    };

    #[test]
    fn inside_boundary_is_half_open() {
        assert!(point_in_image([0.0, 0.0], HD));
        assert!(point_in_image([1919.5, 1079.9], HD));
        assert!(!point_in_image([1920.0, 10.0], HD));
        assert!(!point_in_image([10.0, 1080.0], HD));
        assert!(!point_in_image([-0.1, 10.0], HD));
    }

    #[test]
    fn border_rows_in_top_left_origin() {
        // the first row is inside, the row at y = H is not
        let top = Quadrilateral2D::from_rect(100.0, 0.0, 200.0, 50.0);
        assert!(top.is_inside(HD));
        let bottom = Quadrilateral2D::from_rect(100.0, 1030.0, 200.0, 1080.0);
        assert!(!bottom.is_inside(HD));
        assert!(bottom.contains_point(HD));
    }

    #[test]
    fn quad_fully_inside() {
        let quad = Quadrilateral2D {
            top_left: [694.0, 224.0],
            top_right: [1098.0, 185.0],
            bottom_left: [686.0, 317.0],
            bottom_right: [1119.0, 409.0],
        };
        assert!(quad.is_inside(HD));
        assert!(quad.contains_point(HD));
        assert!(quad.intersects(HD));
    }

    #[test]
    fn quad_one_vertex_inside() {
        let quad = Quadrilateral2D {
            top_left: [1800.0, 1000.0],
            top_right: [2500.0, 1000.0],
            bottom_left: [1800.0, 1600.0],
            bottom_right: [2500.0, 1600.0],
        };
        assert!(quad.contains_point(HD));
        assert!(quad.intersects(HD));
        assert!(!quad.is_inside(HD));
    }

    #[test]
    fn quad_crossing_without_vertex_inside() {
        // a thin band crossing the whole image horizontally
        let quad = Quadrilateral2D::from_rect(-100.0, 500.0, 2000.0, 600.0);
        assert!(!quad.contains_point(HD));
        assert!(quad.intersects(HD));
    }

    #[test]
    fn quad_covering_image_without_edge_crossing() {
        // the image sits strictly inside the quadrilateral
        let quad = Quadrilateral2D::from_rect(-100.0, -100.0, 2100.0, 1200.0);
        assert!(!quad.contains_point(HD));
        assert!(!quad.intersects(HD));
    }

    #[test]
    fn quad_entirely_outside() {
        let quad = Quadrilateral2D::from_rect(3000.0, 3000.0, 3500.0, 3300.0);
        assert!(!quad.intersects(HD));
        assert!(!quad.is_inside(HD));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        assert!(!segments_intersect(
            [0.0, 0.0],
            [10.0, 0.0],
            [0.0, 0.0],
            [10.0, 0.0]
        ));
        assert!(segments_intersect(
            [0.0, 0.0],
            [10.0, 10.0],
            [0.0, 10.0],
            [10.0, 0.0]
        ));
    }

    #[test]
    fn bounding_box_and_translate() {
        let quad = Quadrilateral2D {
            top_left: [-100.0, -100.0],
            top_right: [2000.0, -185.0],
            bottom_left: [-233.0, 1200.0],
            bottom_right: [2200.0, 1670.0],
        };
        let bb = quad.bounding_box();
        assert_eq!(
            bb,
            BoundingBox {
                min_x: -233.0,
                min_y: -185.0,
                max_x: 2200.0,
                max_y: 1670.0,
            }
        );
        assert_eq!(bb.width(), 2433.0);
        assert_eq!(bb.height(), 1855.0);

        let moved = quad.translated(233.0, 185.0);
        assert_eq!(moved.top_left, [133.0, 85.0]);
        assert_eq!(moved.bounding_box().min_x, 0.0);
        assert_eq!(moved.bounding_box().min_y, 0.0);
    }
}
