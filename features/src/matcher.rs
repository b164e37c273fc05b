use recon_core::{Descriptors, FeatureMatch};

/// Brute-force 2-NN Hamming matching with Lowe's ratio test.
///
/// For each query descriptor, find its two nearest train descriptors and keep
/// the best iff `best < ratio · second_best`. The test needs two neighbors,
/// so a train set with fewer than 2 descriptors matches nothing.
pub fn match_pair(query: &Descriptors, train: &Descriptors, ratio: f32) -> Vec<FeatureMatch> {
    if train.len() < 2 {
        return Vec::new();
    }

    let mut matches = Vec::new();

    for (query_idx, q_desc) in query.iter().enumerate() {
        let mut best: Option<(usize, u32)> = None;
        let mut second_best: Option<u32> = None;

        for (train_idx, t_desc) in train.iter().enumerate() {
            let distance = q_desc.hamming_distance(t_desc);

            match best {
                None => best = Some((train_idx, distance)),
                Some((_, best_dist)) if distance < best_dist => {
                    second_best = Some(best_dist);
                    best = Some((train_idx, distance));
                }
                Some(_) => {
                    if second_best.map_or(true, |s| distance < s) {
                        second_best = Some(distance);
                    }
                }
            }
        }

        if let (Some((train_idx, distance)), Some(second)) = (best, second_best) {
            if (distance as f32) < ratio * second as f32 {
                matches.push(FeatureMatch::new(query_idx, train_idx, distance as f32));
            }
        }
    }

    matches
}
