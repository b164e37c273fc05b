use image::GrayImage;
use recon_core::KeyPoint;

/// Bresenham circle of radius 3 around the candidate pixel.
const CIRCLE_OFFSETS: [(i32, i32); 12] = [
    (-3, 0),
    (-2, 1),
    (-1, 2),
    (0, 3),
    (1, 2),
    (2, 1),
    (3, 0),
    (2, -1),
    (1, -2),
    (0, -3),
    (-1, -2),
    (-2, -1),
];

/// FAST corner detection: a pixel is a corner when at least 9 of the 12
/// circle pixels are all brighter or all darker than it by `threshold`.
/// Keeps the `max_keypoints` strongest responses.
pub fn fast_detect(image: &GrayImage, threshold: u8, max_keypoints: usize) -> Vec<KeyPoint> {
    let width = image.width() as i32;
    let height = image.height() as i32;
    let mut keypoints = Vec::new();

    for y in 3..height - 3 {
        for x in 3..width - 3 {
            let p = image.get_pixel(x as u32, y as u32)[0];

            let mut brighter = 0u32;
            let mut darker = 0u32;

            for &(dx, dy) in &CIRCLE_OFFSETS {
                let val = image.get_pixel((x + dx) as u32, (y + dy) as u32)[0];
                if val > p.saturating_add(threshold) {
                    brighter += 1;
                } else if val < p.saturating_sub(threshold) {
                    darker += 1;
                }
            }

            if brighter >= 9 || darker >= 9 {
                let response = brighter.max(darker) as f64;
                keypoints.push(KeyPoint::new(x as f64, y as f64).with_response(response));
            }
        }
    }

    if keypoints.len() > max_keypoints {
        keypoints.sort_by(|a, b| {
            b.response
                .partial_cmp(&a.response)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        keypoints.truncate(max_keypoints);
    }

    keypoints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_with_bright_square() -> GrayImage {
        let mut img = GrayImage::from_pixel(32, 32, image::Luma([20u8]));
        for y in 12..20 {
            for x in 12..20 {
                img.put_pixel(x, y, image::Luma([220u8]));
            }
        }
        img
    }

    #[test]
    fn detects_corners_of_contrast_square() {
        let img = image_with_bright_square();
        let kps = fast_detect(&img, 20, 5000);
        assert!(!kps.is_empty());
        // All detections cluster around the square.
        for kp in &kps {
            assert!(kp.x >= 9.0 && kp.x <= 22.0, "x = {}", kp.x);
            assert!(kp.y >= 9.0 && kp.y <= 22.0, "y = {}", kp.y);
        }
    }

    #[test]
    fn flat_image_yields_no_keypoints() {
        let img = GrayImage::from_pixel(32, 32, image::Luma([128u8]));
        assert!(fast_detect(&img, 20, 5000).is_empty());
    }

    #[test]
    fn cap_keeps_strongest() {
        let img = image_with_bright_square();
        let all = fast_detect(&img, 20, 5000);
        let capped = fast_detect(&img, 20, 2);
        assert!(capped.len() <= 2);
        if all.len() > 2 {
            let max_response = all.iter().map(|k| k.response).fold(f64::MIN, f64::max);
            assert_eq!(capped[0].response, max_response);
        }
    }
}
