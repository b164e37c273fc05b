use image::RgbImage;
use rayon::prelude::*;
use recon_core::{Descriptors, KeyPoint};
use tracing::debug;

use crate::{brief::Brief, fast::fast_detect, matcher::match_pair};

/// Keypoints and descriptors detected in one image, index-aligned.
#[derive(Debug, Clone)]
pub struct ImageFeatures {
    pub keypoints: Vec<KeyPoint>,
    pub descriptors: Descriptors,
}

/// Features per image plus matches for each consecutive pair:
/// `pair_matches[i]` relates image i (query) to image i+1 (train).
#[derive(Debug, Clone)]
pub struct MatchGraph {
    pub per_image: Vec<ImageFeatures>,
    pub pair_matches: Vec<Vec<recon_core::FeatureMatch>>,
}

/// Detection/matching configuration. A fresh value per call: no shared
/// detector state between requests.
#[derive(Debug, Clone)]
pub struct FeatureMatcher {
    pub fast_threshold: u8,
    pub max_keypoints: usize,
    pub descriptor_bytes: usize,
    pub pattern_seed: u64,
    pub ratio: f32,
}

impl Default for FeatureMatcher {
    fn default() -> Self {
        Self {
            fast_threshold: 20,
            max_keypoints: crate::MAX_KEYPOINTS,
            descriptor_bytes: 32,
            pattern_seed: 0x42,
            ratio: crate::RATIO_TEST_THRESHOLD,
        }
    }
}

impl FeatureMatcher {
    /// Detect features in every image and match each consecutive pair.
    ///
    /// An image with no detectable corners contributes empty feature lists
    /// and empty match lists for its pairs; never an error.
    pub fn detect_and_match(&self, images: &[RgbImage]) -> MatchGraph {
        // One pattern shared across images so descriptors are comparable.
        let brief = Brief::new(self.descriptor_bytes, self.pattern_seed);

        let per_image: Vec<ImageFeatures> = images
            .par_iter()
            .map(|img| {
                let gray = image::imageops::grayscale(img);
                let keypoints = fast_detect(&gray, self.fast_threshold, self.max_keypoints);
                let descriptors = brief.compute(&gray, &keypoints);
                ImageFeatures {
                    keypoints,
                    descriptors,
                }
            })
            .collect();

        let pair_matches: Vec<Vec<recon_core::FeatureMatch>> = per_image
            .windows(2)
            .map(|pair| match_pair(&pair[0].descriptors, &pair[1].descriptors, self.ratio))
            .collect();

        for (i, m) in pair_matches.iter().enumerate() {
            debug!(pair = i, matches = m.len(), "matched consecutive image pair");
        }

        MatchGraph {
            per_image,
            pair_matches,
        }
    }
}
