use nalgebra::Point2;

/// A detected image feature location in pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub struct KeyPoint {
    pub x: f64,
    pub y: f64,
    pub response: f64,
}

impl KeyPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            response: 0.0,
        }
    }

    pub fn with_response(mut self, response: f64) -> Self {
        self.response = response;
        self
    }

    pub fn pt(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

impl Default for KeyPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A correspondence between two keypoint lists.
///
/// Indices are only meaningful against the pair of lists the match was
/// produced from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureMatch {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: f32,
}

impl FeatureMatch {
    pub fn new(query_idx: usize, train_idx: usize, distance: f32) -> Self {
        Self {
            query_idx,
            train_idx,
            distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypoint_pt() {
        let kp = KeyPoint::new(3.0, 4.0).with_response(12.0);
        assert_eq!(kp.pt(), Point2::new(3.0, 4.0));
        assert_eq!(kp.response, 12.0);
    }

    #[test]
    fn feature_match_fields() {
        let m = FeatureMatch::new(2, 7, 13.0);
        assert_eq!(m.query_idx, 2);
        assert_eq!(m.train_idx, 7);
        assert_eq!(m.distance, 13.0);
    }
}
