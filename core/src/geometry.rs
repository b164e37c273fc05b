use nalgebra::{Matrix3, Matrix3x4, Point2, Point3, Vector3};

const MIN_DEPTH: f64 = 1e-12;

/// Pinhole camera intrinsics in pixel units.
#[derive(Debug, Clone, Copy)]
pub struct CameraIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub width: u32,
    pub height: u32,
}

impl CameraIntrinsics {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64, width: u32, height: u32) -> Self {
        Self {
            fx,
            fy,
            cx,
            cy,
            width,
            height,
        }
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, 0.0, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }

    /// Closed-form inverse of the calibration matrix.
    pub fn inverse_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            1.0 / self.fx,
            0.0,
            -self.cx / self.fx,
            0.0,
            1.0 / self.fy,
            -self.cy / self.fy,
            0.0,
            0.0,
            1.0,
        )
    }

    /// Mean focal length, used to scale pixel thresholds into normalized units.
    pub fn focal(&self) -> f64 {
        0.5 * (self.fx + self.fy)
    }

    /// Pixel coordinates to normalized image coordinates.
    pub fn normalize(&self, p: &Point2<f64>) -> Point2<f64> {
        Point2::new((p.x - self.cx) / self.fx, (p.y - self.cy) / self.fy)
    }

    /// Project a camera-frame point; `None` when the point has no positive depth.
    pub fn project(&self, p: &Point3<f64>) -> Option<Point2<f64>> {
        if p.z <= MIN_DEPTH {
            return None;
        }
        Some(Point2::new(
            self.fx * p.x / p.z + self.cx,
            self.fy * p.y / p.z + self.cy,
        ))
    }
}

/// A camera pose with its calibration: the factors K, R, t of the 3×4
/// projection `K·[R|t]`, kept separate so re-projection can reuse them.
#[derive(Debug, Clone)]
pub struct CameraPose {
    pub intrinsics: CameraIntrinsics,
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl CameraPose {
    pub fn new(intrinsics: CameraIntrinsics, rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            intrinsics,
            rotation,
            translation,
        }
    }

    /// The reference camera: identity rotation, zero translation, so the
    /// projection is `K·[I|0]`.
    pub fn reference(intrinsics: CameraIntrinsics) -> Self {
        Self::new(intrinsics, Matrix3::identity(), Vector3::zeros())
    }

    pub fn projection(&self) -> Matrix3x4<f64> {
        let mut rt = Matrix3x4::zeros();
        rt.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        rt.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        self.intrinsics.matrix() * rt
    }

    /// Project a world point through this camera; `None` behind the camera.
    pub fn project(&self, p: &Point3<f64>) -> Option<Point2<f64>> {
        let cam = self.rotation * p.coords + self.translation;
        self.intrinsics.project(&Point3::from(cam))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_intrinsics() -> CameraIntrinsics {
        CameraIntrinsics::new(1000.0, 1000.0, 500.0, 500.0, 1000, 1000)
    }

    #[test]
    fn matrix_inverse_roundtrip() {
        let k = test_intrinsics();
        let prod = k.matrix() * k.inverse_matrix();
        assert!((prod - Matrix3::identity()).norm() < 1e-12);
    }

    #[test]
    fn normalize_inverts_projection() {
        let k = test_intrinsics();
        let p = Point3::new(0.2, -0.1, 2.0);
        let px = k.project(&p).unwrap();
        let n = k.normalize(&px);
        assert!((n.x - 0.1).abs() < 1e-12);
        assert!((n.y + 0.05).abs() < 1e-12);
    }

    #[test]
    fn project_rejects_nonpositive_depth() {
        let k = test_intrinsics();
        assert!(k.project(&Point3::new(0.0, 0.0, 0.0)).is_none());
        assert!(k.project(&Point3::new(0.0, 0.0, -1.0)).is_none());
    }

    #[test]
    fn reference_pose_projection() {
        let pose = CameraPose::reference(test_intrinsics());
        let proj = pose.projection();
        // K·[I|0]: left block is K, last column is zero.
        assert_eq!(proj[(0, 0)], 1000.0);
        assert_eq!(proj[(0, 2)], 500.0);
        assert_eq!(proj[(0, 3)], 0.0);
        assert_eq!(proj[(2, 3)], 0.0);
    }

    #[test]
    fn translated_pose_projects_with_offset() {
        let k = test_intrinsics();
        let pose = CameraPose::new(k, Matrix3::identity(), Vector3::new(-1.0, 0.0, 0.0));
        let px = pose.project(&Point3::new(0.0, 0.0, 5.0)).unwrap();
        assert!((px.x - 300.0).abs() < 1e-9);
        assert!((px.y - 500.0).abs() < 1e-9);
    }
}
