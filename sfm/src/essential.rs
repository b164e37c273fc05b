//! Essential matrix estimation from pixel correspondences.

use nalgebra::{DMatrix, Matrix3, Point2, Vector3};
use recon_core::{CameraIntrinsics, Ransac, RobustConfig, RobustModel};

use crate::{Result, SfmError};

/// Convert pixel coordinates to normalized image coordinates with `K⁻¹`.
pub fn normalize_with_intrinsics(
    pts: &[Point2<f64>],
    intrinsics: &CameraIntrinsics,
) -> Vec<Point2<f64>> {
    let k_inv = intrinsics.inverse_matrix();
    pts.iter()
        .map(|p| {
            let v = k_inv * Vector3::new(p.x, p.y, 1.0);
            Point2::new(v[0] / v[2], v[1] / v[2])
        })
        .collect()
}

/// 8-point essential matrix from normalized correspondences, with the
/// rank-2 / equal-singular-value constraint enforced.
pub fn estimate_essential_8_point(
    pts1: &[Point2<f64>],
    pts2: &[Point2<f64>],
) -> Result<Matrix3<f64>> {
    if pts1.len() != pts2.len() || pts1.len() < 8 {
        return Err(SfmError::PoseEstimation(
            "essential estimation needs >=8 paired points".to_string(),
        ));
    }

    let n = pts1.len();
    let mut a = DMatrix::<f64>::zeros(n, 9);
    for i in 0..n {
        let x1 = pts1[i].x;
        let y1 = pts1[i].y;
        let x2 = pts2[i].x;
        let y2 = pts2[i].y;
        a[(i, 0)] = x2 * x1;
        a[(i, 1)] = x2 * y1;
        a[(i, 2)] = x2;
        a[(i, 3)] = y2 * x1;
        a[(i, 4)] = y2 * y1;
        a[(i, 5)] = y2;
        a[(i, 6)] = x1;
        a[(i, 7)] = y1;
        a[(i, 8)] = 1.0;
    }

    let svd = a.svd(true, true);
    let vt = svd
        .v_t
        .ok_or_else(|| SfmError::PoseEstimation("SVD failed on the 8-point system".to_string()))?;
    let evec = vt.row(vt.nrows() - 1);
    let e = Matrix3::new(
        evec[(0, 0)],
        evec[(0, 1)],
        evec[(0, 2)],
        evec[(0, 3)],
        evec[(0, 4)],
        evec[(0, 5)],
        evec[(0, 6)],
        evec[(0, 7)],
        evec[(0, 8)],
    );
    enforce_essential_constraints(&e)
}

/// Project onto the essential manifold: two equal singular values, third zero.
fn enforce_essential_constraints(e: &Matrix3<f64>) -> Result<Matrix3<f64>> {
    let svd = e.svd(true, true);
    let u = svd
        .u
        .ok_or_else(|| SfmError::PoseEstimation("SVD U missing".to_string()))?;
    let vt = svd
        .v_t
        .ok_or_else(|| SfmError::PoseEstimation("SVD V^T missing".to_string()))?;
    let s = 0.5 * (svd.singular_values[0] + svd.singular_values[1]);
    let sigma = Matrix3::new(s, 0.0, 0.0, 0.0, s, 0.0, 0.0, 0.0, 0.0);
    Ok(u * sigma * vt)
}

/// First-order geometric (Sampson) residual of a normalized pair against E.
pub fn sampson_error(e: &Matrix3<f64>, p1: &Point2<f64>, p2: &Point2<f64>) -> f64 {
    let x1 = Vector3::new(p1.x, p1.y, 1.0);
    let x2 = Vector3::new(p2.x, p2.y, 1.0);
    let ex1 = e * x1;
    let etx2 = e.transpose() * x2;
    let x2tex1 = x2.dot(&ex1);
    let denom = ex1[0] * ex1[0] + ex1[1] * ex1[1] + etx2[0] * etx2[0] + etx2[1] * etx2[1];
    if denom <= 1e-18 {
        f64::INFINITY
    } else {
        (x2tex1 * x2tex1) / denom
    }
}

pub struct EssentialEstimator;

impl RobustModel<(Point2<f64>, Point2<f64>)> for EssentialEstimator {
    type Model = Matrix3<f64>;

    fn min_sample_size(&self) -> usize {
        8
    }

    fn estimate(&self, data: &[&(Point2<f64>, Point2<f64>)]) -> Option<Self::Model> {
        let pts1: Vec<Point2<f64>> = data.iter().map(|p| p.0).collect();
        let pts2: Vec<Point2<f64>> = data.iter().map(|p| p.1).collect();
        estimate_essential_8_point(&pts1, &pts2).ok()
    }

    fn compute_error(&self, model: &Self::Model, data: &(Point2<f64>, Point2<f64>)) -> f64 {
        sampson_error(model, &data.0, &data.1)
    }
}

/// RANSAC essential matrix from pixel correspondences.
///
/// Each side is normalized with its own camera's intrinsics; the pixel
/// threshold is scaled into normalized units by the second camera's focal
/// length and squared to match the Sampson residual.
pub fn find_essential_ransac(
    pts1: &[Point2<f64>],
    pts2: &[Point2<f64>],
    k1: &CameraIntrinsics,
    k2: &CameraIntrinsics,
    threshold_px: f64,
    max_iters: usize,
) -> Result<(Matrix3<f64>, Vec<bool>)> {
    let n1 = normalize_with_intrinsics(pts1, k1);
    let n2 = normalize_with_intrinsics(pts2, k2);
    let data: Vec<(Point2<f64>, Point2<f64>)> = n1.into_iter().zip(n2).collect();

    let thresh_norm = threshold_px / k2.focal().max(1e-12);

    let config = RobustConfig {
        threshold: thresh_norm * thresh_norm,
        max_iterations: max_iters,
        confidence: 0.999,
    };

    let ransac = Ransac::new(config);
    let res = ransac.run(&EssentialEstimator, &data);

    let model = res
        .model
        .ok_or_else(|| SfmError::PoseEstimation("RANSAC found no essential matrix".to_string()))?;
    Ok((model, res.inliers))
}
