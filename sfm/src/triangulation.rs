//! DLT triangulation of landmark correspondences.

use nalgebra::{Matrix3x4, Matrix4, Point2, Point3};
use rayon::prelude::*;
use recon_core::CameraPose;
use tracing::debug;

use crate::{Result, SfmError};

/// Triangulate one point from two views by the homogeneous DLT system.
///
/// A vanishing homogeneous scale (`|w| < 1e-12`) means the rays do not
/// intersect meaningfully (e.g. identical cameras); the origin is returned
/// rather than dividing.
pub fn triangulate_point_dlt(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    proj1: &Matrix3x4<f64>,
    proj2: &Matrix3x4<f64>,
) -> Result<Point3<f64>> {
    let mut m = Matrix4::<f64>::zeros();
    for c in 0..4 {
        m[(0, c)] = p1.x * proj1[(2, c)] - proj1[(0, c)];
        m[(1, c)] = p1.y * proj1[(2, c)] - proj1[(1, c)];
        m[(2, c)] = p2.x * proj2[(2, c)] - proj2[(0, c)];
        m[(3, c)] = p2.y * proj2[(2, c)] - proj2[(1, c)];
    }

    let svd = m.svd(true, true);
    let vt = svd
        .v_t
        .ok_or_else(|| SfmError::Triangulation("SVD failed on DLT system".to_string()))?;
    let xh = vt.row(3);
    let w = xh[(0, 3)];
    if w.abs() < 1e-12 {
        return Ok(Point3::origin());
    }
    Ok(Point3::new(
        xh[(0, 0)] / w,
        xh[(0, 1)] / w,
        xh[(0, 2)] / w,
    ))
}

/// Triangulate index-aligned landmark sets against camera poses.
///
/// Uses exactly the first two sets and the first two poses; extra views are
/// ignored. Fewer than two of either is a degenerate input and yields an
/// empty point list, not an error.
pub fn triangulate_landmarks(
    landmark_sets: &[Vec<Point2<f64>>],
    poses: &[CameraPose],
) -> Result<Vec<Point3<f64>>> {
    if landmark_sets.len() < 2 || poses.len() < 2 {
        debug!(
            sets = landmark_sets.len(),
            poses = poses.len(),
            "not enough views to triangulate"
        );
        return Ok(Vec::new());
    }

    let proj1 = poses[0].projection();
    let proj2 = poses[1].projection();
    let n = landmark_sets[0].len().min(landmark_sets[1].len());

    (0..n)
        .into_par_iter()
        .map(|i| triangulate_point_dlt(&landmark_sets[0][i], &landmark_sets[1][i], &proj1, &proj2))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, Vector3};
    use recon_core::CameraIntrinsics;

    fn centered_k() -> CameraIntrinsics {
        CameraIntrinsics::new(1000.0, 1000.0, 500.0, 500.0, 1000, 1000)
    }

    #[test]
    fn roundtrip_known_point() {
        // Camera 2 sits at (1, 0, 0) in world coordinates: t = -R·C.
        let pose1 = CameraPose::reference(centered_k());
        let pose2 = CameraPose::new(
            centered_k(),
            Matrix3::identity(),
            Vector3::new(-1.0, 0.0, 0.0),
        );

        let world = Point3::new(0.0, 0.0, 5.0);
        let px1 = pose1.project(&world).unwrap();
        let px2 = pose2.project(&world).unwrap();

        let sets = vec![vec![px1], vec![px2]];
        let pts = triangulate_landmarks(&sets, &[pose1, pose2]).unwrap();

        assert_eq!(pts.len(), 1);
        assert!((pts[0] - world).norm() < 1e-3, "got {}", pts[0]);
    }

    #[test]
    fn single_view_is_empty_not_error() {
        let pose = CameraPose::reference(centered_k());
        let sets = vec![vec![Point2::new(500.0, 500.0)]];
        let pts = triangulate_landmarks(&sets, &[pose]).unwrap();
        assert!(pts.is_empty());
    }

    #[test]
    fn identical_cameras_degrade_gracefully() {
        // Zero baseline: depth is unobservable. The solver must still return
        // a finite point (somewhere on the shared viewing ray, or the origin
        // when the homogeneous scale vanishes), never NaN and never an error.
        let pose = CameraPose::reference(centered_k());
        let proj = pose.projection();
        let p = Point2::new(510.0, 490.0);
        let x = triangulate_point_dlt(&p, &p, &proj, &proj).unwrap();
        assert!(x.x.is_finite() && x.y.is_finite() && x.z.is_finite());
    }

    #[test]
    fn extra_views_are_ignored() {
        let pose1 = CameraPose::reference(centered_k());
        let pose2 = CameraPose::new(
            centered_k(),
            Matrix3::identity(),
            Vector3::new(-1.0, 0.0, 0.0),
        );
        let pose3 = CameraPose::new(
            centered_k(),
            Matrix3::identity(),
            Vector3::new(0.0, -1.0, 0.0),
        );

        let world = Point3::new(0.2, -0.1, 4.0);
        let px1 = pose1.project(&world).unwrap();
        let px2 = pose2.project(&world).unwrap();

        // Third set is garbage; it must not affect the result.
        let sets = vec![vec![px1], vec![px2], vec![Point2::new(0.0, 0.0)]];
        let pts = triangulate_landmarks(&sets, &[pose1, pose2, pose3]).unwrap();
        assert!((pts[0] - world).norm() < 1e-3);
    }
}
