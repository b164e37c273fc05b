//! Feature detection, description, and matching.
//!
//! FAST corners, BRIEF binary descriptors, brute-force Hamming matching with
//! Lowe's ratio test, and the per-image-pair match graph the pose estimator
//! consumes.

pub mod brief;
pub mod fast;
pub mod graph;
pub mod matcher;

pub use brief::Brief;
pub use fast::fast_detect;
pub use graph::{FeatureMatcher, ImageFeatures, MatchGraph};
pub use matcher::match_pair;

/// Lowe's ratio: keep a match iff best < ratio · second-best.
pub const RATIO_TEST_THRESHOLD: f32 = 0.7;

pub const MAX_KEYPOINTS: usize = 5000;
