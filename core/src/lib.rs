//! Core types shared across the face reconstruction pipeline.
//!
//! Keypoints, binary descriptors, camera models, detector landmark types,
//! and a generic RANSAC engine. Higher-level crates (`recon-features`,
//! `recon-sfm`, `recon-mesh`, `recon-pipeline`) build on these.

pub mod descriptor;
pub mod geometry;
pub mod keypoint;
pub mod landmarks;
pub mod robust;

pub use descriptor::{Descriptor, Descriptors};
pub use geometry::{CameraIntrinsics, CameraPose};
pub use keypoint::{FeatureMatch, KeyPoint};
pub use landmarks::{BoundingBox, FaceLandmarks, LandmarkPoint, PoseAngles, KEY_LANDMARK_INDICES};
pub use robust::{Ransac, RobustConfig, RobustModel, RobustResult};
