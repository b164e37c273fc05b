use recon_core::CameraIntrinsics;

/// Focal length as a multiple of image width. A deliberate approximation for
/// uncalibrated input: typical phone/webcam portraits land near this value.
pub const FOCAL_WIDTH_FACTOR: f64 = 1.2;

/// Intrinsics for an uncalibrated image: `fx = fy = 1.2·width`, principal
/// point at the image center.
pub fn approximate_intrinsics(width: u32, height: u32) -> CameraIntrinsics {
    let f = width as f64 * FOCAL_WIDTH_FACTOR;
    CameraIntrinsics::new(
        f,
        f,
        width as f64 / 2.0,
        height as f64 / 2.0,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_values() {
        let k = approximate_intrinsics(640, 480);
        assert_eq!(k.fx, 768.0);
        assert_eq!(k.fy, 768.0);
        assert_eq!(k.cx, 320.0);
        assert_eq!(k.cy, 240.0);
    }
}
