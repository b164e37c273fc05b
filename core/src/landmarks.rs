use nalgebra::{Point2, Point3};

/// Indices of the stable facial features (nose tip, eye corners, mouth
/// corners, chin, jaw) used as cross-view correspondences for triangulation.
pub const KEY_LANDMARK_INDICES: [usize; 8] = [1, 33, 61, 199, 291, 263, 172, 175];

/// A single landmark in pixel units; `z` is the detector's relative depth.
#[derive(Debug, Clone, Copy)]
pub struct LandmarkPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LandmarkPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn pt2(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn pt3(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// Head orientation in degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoseAngles {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Output of an external landmark detector for one face, passed through
/// the pipeline unchanged.
#[derive(Debug, Clone)]
pub struct FaceLandmarks {
    pub landmarks: Vec<LandmarkPoint>,
    pub confidence: f64,
    pub bounding_box: BoundingBox,
    pub pose_angles: PoseAngles,
}

impl FaceLandmarks {
    /// The key-landmark subset as 2D points, in `KEY_LANDMARK_INDICES` order.
    /// Indices past the end of the landmark list are skipped.
    pub fn key_points(&self) -> Vec<Point2<f64>> {
        KEY_LANDMARK_INDICES
            .iter()
            .filter_map(|&i| self.landmarks.get(i))
            .map(LandmarkPoint::pt2)
            .collect()
    }
}
