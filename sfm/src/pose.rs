//! Relative pose recovery and the per-view pose chain.

use nalgebra::{Matrix3, Matrix3x4, Point2, Vector3};
use recon_core::{CameraIntrinsics, CameraPose};
use recon_features::MatchGraph;
use tracing::{debug, warn};

use crate::essential::{find_essential_ransac, normalize_with_intrinsics};
use crate::intrinsics::approximate_intrinsics;
use crate::triangulation::triangulate_point_dlt;
use crate::{Result, SfmError};

/// Below this many matches a pair carries too little geometry; the later
/// camera keeps the reference pose instead.
pub const MIN_PAIR_MATCHES: usize = 8;

const RANSAC_THRESHOLD_PX: f64 = 1.0;
const RANSAC_MAX_ITERS: usize = 1000;

/// Recover (R, t) of the second camera relative to the first from an
/// essential matrix, disambiguating the four candidate decompositions by the
/// positive-depth (cheirality) count over the given pixel correspondences.
pub fn recover_pose_from_essential(
    essential: &Matrix3<f64>,
    pts1: &[Point2<f64>],
    pts2: &[Point2<f64>],
    k1: &CameraIntrinsics,
    k2: &CameraIntrinsics,
) -> Result<(Matrix3<f64>, Vector3<f64>)> {
    if pts1.len() != pts2.len() || pts1.len() < 5 {
        return Err(SfmError::PoseEstimation(
            "pose recovery needs >=5 paired points".to_string(),
        ));
    }

    let svd = essential.svd(true, true);
    let mut u = svd
        .u
        .ok_or_else(|| SfmError::PoseEstimation("SVD U missing in pose recovery".to_string()))?;
    let mut vt = svd
        .v_t
        .ok_or_else(|| SfmError::PoseEstimation("SVD V^T missing in pose recovery".to_string()))?;

    if u.determinant() < 0.0 {
        u = -u;
    }
    if vt.determinant() < 0.0 {
        vt = -vt;
    }

    let w = Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
    let r1 = u * w * vt;
    let r2 = u * w.transpose() * vt;
    let t = u.column(2).into_owned();

    let candidates = [(r1, t), (r1, -t), (r2, t), (r2, -t)];

    let norm1 = normalize_with_intrinsics(pts1, k1);
    let norm2 = normalize_with_intrinsics(pts2, k2);

    let p1 = Matrix3x4::new(
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0,
    );

    let mut best = None;
    let mut best_score = i32::MIN;
    for (r, t) in candidates {
        let mut p2 = Matrix3x4::zeros();
        p2.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
        p2.fixed_view_mut::<3, 1>(0, 3).copy_from(&t);

        let mut score = 0i32;
        for (a, b) in norm1.iter().zip(norm2.iter()) {
            let x = triangulate_point_dlt(a, b, &p1, &p2)?;
            let z2 = (r * x.coords + t)[2];
            if x.z > 0.0 && z2 > 0.0 {
                score += 1;
            }
        }
        if score > best_score {
            best_score = score;
            best = Some((r, t));
        }
    }

    best.ok_or_else(|| SfmError::PoseEstimation("no valid pose candidate".to_string()))
}

/// Chain of camera poses over the image sequence.
///
/// The first camera is the reference (`K₁·[I|0]`). Every later camera is
/// posed against its immediate predecessor from that pair's matches and
/// expressed with its own intrinsic estimate; there is no global frame and
/// no bundle adjustment. A pair with fewer than [`MIN_PAIR_MATCHES`] matches
/// leaves the later camera at the reference pose.
pub fn estimate_camera_poses(dims: &[(u32, u32)], graph: &MatchGraph) -> Result<Vec<CameraPose>> {
    if dims.is_empty() {
        return Ok(Vec::new());
    }

    let (w0, h0) = dims[0];
    let reference = CameraPose::reference(approximate_intrinsics(w0, h0));
    let mut poses = vec![reference.clone()];

    for i in 0..dims.len() - 1 {
        let matches = &graph.pair_matches[i];
        if matches.len() < MIN_PAIR_MATCHES {
            debug!(
                pair = i,
                matches = matches.len(),
                "too few matches, keeping reference pose"
            );
            poses.push(reference.clone());
            continue;
        }

        let kps1 = &graph.per_image[i].keypoints;
        let kps2 = &graph.per_image[i + 1].keypoints;
        let pts1: Vec<Point2<f64>> = matches.iter().map(|m| kps1[m.query_idx].pt()).collect();
        let pts2: Vec<Point2<f64>> = matches.iter().map(|m| kps2[m.train_idx].pt()).collect();

        let (wi, hi) = dims[i];
        let (wj, hj) = dims[i + 1];
        let k1 = approximate_intrinsics(wi, hi);
        let k2 = approximate_intrinsics(wj, hj);

        let (essential, inliers) =
            find_essential_ransac(&pts1, &pts2, &k1, &k2, RANSAC_THRESHOLD_PX, RANSAC_MAX_ITERS)?;

        let in1: Vec<Point2<f64>> = pts1
            .iter()
            .zip(&inliers)
            .filter(|(_, &keep)| keep)
            .map(|(p, _)| *p)
            .collect();
        let in2: Vec<Point2<f64>> = pts2
            .iter()
            .zip(&inliers)
            .filter(|(_, &keep)| keep)
            .map(|(p, _)| *p)
            .collect();

        let (pts_a, pts_b) = if in1.len() >= 5 {
            (&in1, &in2)
        } else {
            warn!(pair = i, "too few RANSAC inliers, disambiguating over all matches");
            (&pts1, &pts2)
        };

        let (r, t) = recover_pose_from_essential(&essential, pts_a, pts_b, &k1, &k2)?;
        poses.push(CameraPose::new(k2, r, t));
    }

    Ok(poses)
}
