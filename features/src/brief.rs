use image::GrayImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use recon_core::{Descriptor, Descriptors, KeyPoint};

const PATCH_SIZE: i32 = 48;

/// BRIEF descriptor extractor: each bit compares two pixels at fixed offsets
/// inside a patch around the keypoint. The offset pattern is drawn from a
/// seeded RNG so descriptors are comparable across images and across runs.
pub struct Brief {
    bytes: usize,
    pattern: Vec<[(i32, i32); 2]>,
}

impl Brief {
    pub fn new(bytes: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let pattern = (0..bytes * 8)
            .map(|_| {
                let mut point = || {
                    (
                        rng.gen_range(-PATCH_SIZE / 2..PATCH_SIZE / 2),
                        rng.gen_range(-PATCH_SIZE / 2..PATCH_SIZE / 2),
                    )
                };
                [point(), point()]
            })
            .collect();

        Self { bytes, pattern }
    }

    pub fn compute(&self, image: &GrayImage, keypoints: &[KeyPoint]) -> Descriptors {
        let mut descriptors = Descriptors::with_capacity(keypoints.len());
        for kp in keypoints {
            descriptors.push(self.compute_single(image, kp));
        }
        descriptors
    }

    fn compute_single(&self, image: &GrayImage, kp: &KeyPoint) -> Descriptor {
        let x = kp.x as i32;
        let y = kp.y as i32;

        let mut data = vec![0u8; self.bytes];

        for (i, pair) in self.pattern.iter().enumerate() {
            let v1 = get_pixel_safe(image, x + pair[0].0, y + pair[0].1);
            let v2 = get_pixel_safe(image, x + pair[1].0, y + pair[1].1);

            if v1 > v2 {
                data[i / 8] |= 1 << (i % 8);
            }
        }

        Descriptor::new(data)
    }
}

fn get_pixel_safe(image: &GrayImage, x: i32, y: i32) -> u8 {
    if x >= 0 && x < image.width() as i32 && y >= 0 && y < image.height() as i32 {
        image.get_pixel(x as u32, y as u32)[0]
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image() -> GrayImage {
        GrayImage::from_fn(64, 64, |x, y| image::Luma([((x * 3 + y * 5) % 256) as u8]))
    }

    #[test]
    fn same_seed_same_descriptors() {
        let img = gradient_image();
        let kps = vec![KeyPoint::new(32.0, 32.0), KeyPoint::new(20.0, 40.0)];

        let a = Brief::new(32, 7).compute(&img, &kps);
        let b = Brief::new(32, 7).compute(&img, &kps);

        for (da, db) in a.iter().zip(b.iter()) {
            assert_eq!(da.data, db.data);
        }
    }

    #[test]
    fn different_seeds_differ() {
        let img = gradient_image();
        let kps = vec![KeyPoint::new(32.0, 32.0)];

        let a = Brief::new(32, 1).compute(&img, &kps);
        let b = Brief::new(32, 2).compute(&img, &kps);

        assert_ne!(a.descriptors[0].data, b.descriptors[0].data);
    }

    #[test]
    fn descriptor_has_requested_width() {
        let img = gradient_image();
        let kps = vec![KeyPoint::new(10.0, 10.0)];
        let ds = Brief::new(32, 0).compute(&img, &kps);
        assert_eq!(ds.descriptors[0].size(), 32);
    }
}
