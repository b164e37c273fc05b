//! Request-level orchestration: landmark detection fan-out, the advanced
//! reconstruction pipeline with its naive fallback, quality scoring, and
//! the capability report.

pub mod capabilities;
pub mod detector;
pub mod reconstruction;

pub use capabilities::{capabilities, Capabilities};
pub use detector::{DetectorError, LandmarkDetector};
pub use reconstruction::{
    quality_score, reconstruct_multi_view, single_view_landmarks, Error, Reconstruction,
    ReconstructionConfig, MIN_REQUEST_IMAGES,
};
