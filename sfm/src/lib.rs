//! Structure-from-motion: intrinsics heuristic, essential matrix estimation,
//! relative pose recovery, and DLT triangulation.

pub mod essential;
pub mod intrinsics;
pub mod pose;
pub mod triangulation;

pub use essential::{find_essential_ransac, EssentialEstimator};
pub use intrinsics::approximate_intrinsics;
pub use pose::{estimate_camera_poses, recover_pose_from_essential, MIN_PAIR_MATCHES};
pub use triangulation::triangulate_landmarks;

pub type Result<T> = std::result::Result<T, SfmError>;

#[derive(Debug, thiserror::Error)]
pub enum SfmError {
    #[error("Pose estimation failed: {0}")]
    PoseEstimation(String),

    #[error("Triangulation failed: {0}")]
    Triangulation(String),
}
