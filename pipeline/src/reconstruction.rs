//! Multi-view reconstruction orchestration.

use image::RgbImage;
use nalgebra::{Point2, Point3};
use rayon::prelude::*;
use recon_core::{CameraPose, FaceLandmarks};
use recon_features::FeatureMatcher;
use recon_hal::Accelerated;
use recon_mesh::{
    encode_png_base64, laplacian_smooth, remove_outliers, triangulate_planar, MeshParams,
    TextureAtlasBuilder, TriangleMesh, MIN_MESH_POINTS,
};
use recon_sfm::{estimate_camera_poses, triangulate_landmarks};
use tracing::{debug, warn};

use crate::detector::{DetectorError, LandmarkDetector};

pub const MIN_REQUEST_IMAGES: usize = 2;

/// View count at which the coverage term of the quality score saturates.
const IDEAL_VIEW_COUNT: f64 = 9.0;

const LOW_YAW_RANGE_DEG: f64 = 30.0;
const LOW_PITCH_RANGE_DEG: f64 = 10.0;

/// The naive fallback keeps this many leading landmarks as 3D points.
const NAIVE_FALLBACK_LANDMARKS: usize = 10;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("at least 2 images are required for multi-view reconstruction")]
    InvalidRequest,

    #[error("no face detected in image")]
    NoFaceDetected,

    #[error("no faces detected in any image")]
    NoFacesDetected,

    #[error(transparent)]
    Detector(#[from] DetectorError),
}

#[derive(Debug, Clone, Default)]
pub struct ReconstructionConfig {
    pub matcher: FeatureMatcher,
    pub mesh: MeshParams,
    pub atlas: TextureAtlasBuilder,
}

/// Result of a multi-view reconstruction request.
///
/// `points`, `mesh`, and `texture_png_base64` are absent when the
/// corresponding stage was skipped or degraded; `warnings` says why, in
/// pipeline order.
#[derive(Debug)]
pub struct Reconstruction {
    pub landmarks: Vec<FaceLandmarks>,
    pub quality: f64,
    pub points: Option<Vec<Point3<f64>>>,
    pub mesh: Option<TriangleMesh>,
    pub texture_png_base64: Option<String>,
    pub warnings: Vec<String>,
    pub gpu_accelerated: bool,
}

/// Single-image landmark extraction: the detector's output, passed through.
pub fn single_view_landmarks(
    detector: &dyn LandmarkDetector,
    image: &RgbImage,
) -> Result<FaceLandmarks> {
    detector.detect(image)?.ok_or(Error::NoFaceDetected)
}

/// Reconstruction quality in [0, 1] under normal inputs: view coverage
/// saturating at 9 detections, mean detector confidence, and head-angle
/// diversity saturating at 360 degrees of combined yaw+pitch range.
pub fn quality_score(
    num_detections: usize,
    avg_confidence: f64,
    yaw_range: f64,
    pitch_range: f64,
) -> f64 {
    let angle_diversity = (yaw_range.abs() + pitch_range.abs()) / 360.0;
    (num_detections as f64 / IDEAL_VIEW_COUNT) * 0.4
        + avg_confidence * 0.3
        + angle_diversity.min(1.0) * 0.3
}

/// Reconstruct a coarse textured face mesh from two or more views.
///
/// Fails only on malformed requests (`InvalidRequest`) or when no image
/// yields a face (`NoFacesDetected`). Everything downstream degrades into
/// warnings: per-image detection failures, weak pair geometry, too few
/// points for a mesh, and any error inside the advanced pipeline, which
/// falls back to a naive per-landmark depth estimate.
pub fn reconstruct_multi_view(
    detector: &dyn LandmarkDetector,
    images: &[RgbImage],
    config: &ReconstructionConfig,
) -> Result<Reconstruction> {
    if images.len() < MIN_REQUEST_IMAGES {
        return Err(Error::InvalidRequest);
    }

    let detections: Vec<std::result::Result<Option<FaceLandmarks>, DetectorError>> =
        images.par_iter().map(|img| detector.detect(img)).collect();

    let mut warnings = Vec::new();
    let mut landmarks: Vec<FaceLandmarks> = Vec::new();
    let mut view_images: Vec<RgbImage> = Vec::new();
    for (i, det) in detections.into_iter().enumerate() {
        match det {
            Ok(Some(lm)) => {
                landmarks.push(lm);
                view_images.push(images[i].clone());
            }
            Ok(None) => warnings.push(format!("image {}: no face detected", i + 1)),
            Err(e) => warnings.push(format!("image {}: {}", i + 1, e)),
        }
    }
    if landmarks.is_empty() {
        return Err(Error::NoFacesDetected);
    }

    let yaw_range = angle_range(landmarks.iter().map(|l| l.pose_angles.yaw));
    let pitch_range = angle_range(landmarks.iter().map(|l| l.pose_angles.pitch));
    let avg_confidence =
        landmarks.iter().map(|l| l.confidence).sum::<f64>() / landmarks.len() as f64;
    let quality = quality_score(landmarks.len(), avg_confidence, yaw_range, pitch_range);

    let mut points = None;
    let mut mesh = None;
    let mut texture_png_base64 = None;
    let mut gpu_accelerated = false;

    if landmarks.len() >= 2 {
        match advanced_reconstruction(&view_images, &landmarks, config, &mut warnings) {
            Ok(out) => {
                points = Some(out.points);
                mesh = out.mesh;
                texture_png_base64 = out.texture_png_base64;
                gpu_accelerated = out.gpu_accelerated;
            }
            Err(e) => {
                warn!(error = %e, "advanced pipeline failed, falling back");
                warnings.push(format!(
                    "advanced reconstruction failed, using basic method: {e}"
                ));
                points = Some(naive_points(&landmarks[0]));
            }
        }
    } else {
        debug!("only one view with a face, skipping 3D reconstruction");
    }

    if yaw_range < LOW_YAW_RANGE_DEG {
        warnings.push("low yaw angle diversity, reconstruction may be inaccurate".to_string());
    }
    if pitch_range < LOW_PITCH_RANGE_DEG {
        warnings.push("low pitch angle diversity, reconstruction may be inaccurate".to_string());
    }

    Ok(Reconstruction {
        landmarks,
        quality,
        points,
        mesh,
        texture_png_base64,
        warnings,
        gpu_accelerated,
    })
}

fn angle_range(angles: impl Iterator<Item = f64> + Clone) -> f64 {
    let max = angles.clone().fold(f64::MIN, f64::max);
    let min = angles.fold(f64::MAX, f64::min);
    max - min
}

/// First-view landmarks reinterpreted as 3D points, the degraded estimate
/// used when the geometric pipeline fails.
fn naive_points(landmarks: &FaceLandmarks) -> Vec<Point3<f64>> {
    landmarks
        .landmarks
        .iter()
        .take(NAIVE_FALLBACK_LANDMARKS)
        .map(|l| l.pt3())
        .collect()
}

/// Errors internal to the advanced pipeline; absorbed at the boundary above.
#[derive(Debug, thiserror::Error)]
enum StageError {
    #[error(transparent)]
    Sfm(#[from] recon_sfm::SfmError),
}

struct AdvancedOutput {
    points: Vec<Point3<f64>>,
    mesh: Option<TriangleMesh>,
    texture_png_base64: Option<String>,
    gpu_accelerated: bool,
}

/// Feature matching, pose chain, key-landmark triangulation, mesh, texture.
/// Operates only on views where a face was found, index-aligned with
/// `landmarks`. Accelerated variants are consulted first and fall back to
/// the CPU reference paths silently.
fn advanced_reconstruction(
    images: &[RgbImage],
    landmarks: &[FaceLandmarks],
    config: &ReconstructionConfig,
    warnings: &mut Vec<String>,
) -> std::result::Result<AdvancedOutput, StageError> {
    let graph = config.matcher.detect_and_match(images);
    let dims: Vec<(u32, u32)> = images.iter().map(|i| i.dimensions()).collect();
    let poses = estimate_camera_poses(&dims, &graph)?;

    let landmark_sets: Vec<Vec<Point2<f64>>> =
        landmarks.iter().map(|l| l.key_points()).collect();

    let mut gpu_accelerated = false;
    let points: Vec<Point3<f64>> = if landmark_sets.len() >= 2 && poses.len() >= 2 {
        let projections: Vec<_> = poses.iter().take(2).map(|p| p.projection()).collect();
        match recon_hal::accelerate_triangulation(&landmark_sets[..2], &projections) {
            Accelerated::Ready(pts) => {
                gpu_accelerated = true;
                pts
            }
            Accelerated::Unavailable => triangulate_landmarks(&landmark_sets, &poses)?,
        }
    } else {
        triangulate_landmarks(&landmark_sets, &poses)?
    };

    let mut mesh = None;
    let mut texture_png_base64 = None;

    if points.len() >= MIN_MESH_POINTS {
        let (built, texture, smoothed_on_gpu) =
            mesh_stage(&points, images, &poses[0], config, warnings);
        mesh = built;
        texture_png_base64 = texture;
        gpu_accelerated |= smoothed_on_gpu;
    }

    Ok(AdvancedOutput {
        points,
        mesh,
        texture_png_base64,
        gpu_accelerated,
    })
}

/// Outlier filtering, Delaunay connectivity, smoothing, texture. Returns
/// `(mesh, texture payload, whether smoothing ran accelerated)`; degraded
/// stages append warnings instead of failing.
fn mesh_stage(
    points: &[Point3<f64>],
    images: &[RgbImage],
    reference_pose: &CameraPose,
    config: &ReconstructionConfig,
    warnings: &mut Vec<String>,
) -> (Option<TriangleMesh>, Option<String>, bool) {
    let filtered = remove_outliers(points, config.mesh.outlier_threshold);
    if filtered.len() < MIN_MESH_POINTS {
        warnings.push(format!(
            "insufficient points for mesh generation: {}",
            filtered.len()
        ));
        return (None, None, false);
    }

    let planar: Vec<Point2<f64>> = filtered.iter().map(|p| Point2::new(p.x, p.y)).collect();
    let faces = triangulate_planar(&planar);
    if faces.is_empty() {
        warnings.push("mesh generation failed: degenerate planar projection".to_string());
        return (None, None, false);
    }

    let mut vertices = filtered;
    let mut smoothed_on_gpu = false;
    let smoothing = &config.mesh.smoothing;
    match recon_hal::accelerate_smoothing(&vertices, &faces, smoothing.lambda, smoothing.iterations)
    {
        Accelerated::Ready(smoothed) => {
            smoothed_on_gpu = true;
            vertices = smoothed;
        }
        Accelerated::Unavailable => laplacian_smooth(&mut vertices, &faces, smoothing),
    }

    let mut texture_png_base64 = None;
    match encode_png_base64(&config.atlas.build(images, &vertices, reference_pose)) {
        Ok(payload) => texture_png_base64 = Some(payload),
        Err(e) => warnings.push(format!("texture encoding failed: {e}")),
    }

    (
        Some(TriangleMesh::new(vertices, faces)),
        texture_png_base64,
        smoothed_on_gpu,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use recon_core::LandmarkPoint;

    #[test]
    fn quality_saturates_at_exactly_one() {
        // 9 views, full confidence, saturated angle diversity.
        assert_eq!(quality_score(9, 1.0, 300.0, 100.0), 1.0);
    }

    #[test]
    fn quality_grows_with_views() {
        let few = quality_score(2, 0.8, 40.0, 5.0);
        let many = quality_score(6, 0.8, 40.0, 5.0);
        assert!(many > few);
    }

    #[test]
    fn quality_angle_term_uses_absolute_ranges() {
        let q = quality_score(3, 0.5, -90.0, -30.0);
        let expected = (3.0 / 9.0) * 0.4 + 0.5 * 0.3 + (120.0f64 / 360.0).min(1.0) * 0.3;
        assert_eq!(q, expected);
    }

    #[test]
    fn naive_points_take_first_ten() {
        let lm = FaceLandmarks {
            landmarks: (0..30)
                .map(|i| LandmarkPoint::new(i as f64, 0.0, 1.0))
                .collect(),
            confidence: 1.0,
            bounding_box: recon_core::BoundingBox {
                x_min: 0.0,
                y_min: 0.0,
                x_max: 1.0,
                y_max: 1.0,
            },
            pose_angles: recon_core::PoseAngles::default(),
        };
        let pts = naive_points(&lm);
        assert_eq!(pts.len(), 10);
        assert_eq!(pts[9], Point3::new(9.0, 0.0, 1.0));
    }

    #[test]
    fn angle_range_spans_min_to_max() {
        assert_eq!(angle_range([3.0, -7.0, 12.0].into_iter()), 19.0);
        assert_eq!(angle_range([5.0].into_iter()), 0.0);
    }

    fn stage_fixture() -> (Vec<RgbImage>, CameraPose, ReconstructionConfig) {
        let images = vec![RgbImage::from_pixel(32, 32, image::Rgb([100, 100, 100]))];
        let pose = CameraPose::reference(recon_core::CameraIntrinsics::new(
            38.4, 38.4, 16.0, 16.0, 32, 32,
        ));
        (images, pose, ReconstructionConfig::default())
    }

    #[test]
    fn three_surviving_points_warn_and_skip_mesh() {
        // Three clustered points plus one far outlier per axis: each outlier
        // hits z-score sqrt(5) > 2 on its own axis and is dropped, leaving 3.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
            Point3::new(0.0, 0.0, 10.0),
        ];
        let (images, pose, config) = stage_fixture();
        let mut warnings = Vec::new();

        let (mesh, texture, _) = mesh_stage(&points, &images, &pose, &config, &mut warnings);

        assert!(mesh.is_none());
        assert!(texture.is_none());
        assert_eq!(warnings, vec!["insufficient points for mesh generation: 3"]);
    }

    #[test]
    fn collinear_points_warn_degenerate_projection() {
        // All points on one (x, y) line: Delaunay has no triangles to offer.
        let points: Vec<Point3<f64>> = (0..6)
            .map(|i| Point3::new(i as f64 * 0.1, i as f64 * 0.2, 5.0 + 0.01 * i as f64))
            .collect();
        let (images, pose, config) = stage_fixture();
        let mut warnings = Vec::new();

        let (mesh, _, _) = mesh_stage(&points, &images, &pose, &config, &mut warnings);

        assert!(mesh.is_none());
        assert_eq!(
            warnings,
            vec!["mesh generation failed: degenerate planar projection"]
        );
    }

    #[test]
    fn compact_cloud_builds_mesh_and_texture() {
        let points = vec![
            Point3::new(-0.5, -0.25, 4.9),
            Point3::new(0.5, -0.25, 5.1),
            Point3::new(-0.5, 0.25, 5.0),
            Point3::new(0.5, 0.25, 4.8),
            Point3::new(0.0, -0.5, 5.2),
            Point3::new(0.0, 0.5, 4.95),
        ];
        let (images, pose, config) = stage_fixture();
        let mut warnings = Vec::new();

        let (mesh, texture, _) = mesh_stage(&points, &images, &pose, &config, &mut warnings);

        let mesh = mesh.unwrap();
        assert_eq!(mesh.num_vertices(), 6);
        assert!(mesh.num_faces() > 0);
        assert!(mesh.faces.iter().all(|f| f.iter().all(|&i| i < 6)));
        assert!(texture.is_some());
        assert!(warnings.is_empty());
    }
}
