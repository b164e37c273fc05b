use image::RgbImage;
use recon_core::FaceLandmarks;

/// Failure of the external detector itself (model load, inference, I/O).
/// Distinct from "no face in this image", which is a normal outcome.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct DetectorError(pub String);

/// Boundary to the external face landmark detector.
///
/// The pipeline treats the detector's output as opaque: landmark positions
/// and pose angles are passed through, never recomputed.
pub trait LandmarkDetector: Send + Sync {
    /// `Ok(None)` means no face was found in the image.
    fn detect(&self, image: &RgbImage) -> Result<Option<FaceLandmarks>, DetectorError>;
}
