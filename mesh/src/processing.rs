//! Laplacian mesh smoothing.

use nalgebra::Point3;

#[derive(Debug, Clone)]
pub struct SmoothingParams {
    /// Blend factor toward the neighbor average, in [0, 1].
    pub lambda: f64,
    pub iterations: usize,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            lambda: 0.3,
            iterations: 3,
        }
    }
}

/// Neighbor lists built from faces, with multiplicity: a vertex that shares
/// two faces with the same neighbor lists it twice, weighting the average
/// toward heavily shared neighbors.
pub fn vertex_neighbors(faces: &[[usize; 3]], num_vertices: usize) -> Vec<Vec<usize>> {
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); num_vertices];
    for face in faces {
        for i in 0..3 {
            let v0 = face[i];
            let v1 = face[(i + 1) % 3];
            neighbors[v0].push(v1);
            neighbors[v1].push(v0);
        }
    }
    neighbors
}

/// Laplacian relaxation: each vertex moves toward the (multiplicity-weighted)
/// average of its neighbors by factor `lambda`, for `iterations` rounds.
///
/// Every iteration reads the previous iteration's complete result, so update
/// order cannot leak into the output. `lambda = 0` or `iterations = 0` leaves
/// the vertices bit-identical; neighborless vertices never move.
pub fn laplacian_smooth(
    vertices: &mut Vec<Point3<f64>>,
    faces: &[[usize; 3]],
    params: &SmoothingParams,
) {
    if params.lambda == 0.0 || params.iterations == 0 || faces.is_empty() {
        return;
    }

    let neighbors = vertex_neighbors(faces, vertices.len());

    for _ in 0..params.iterations {
        let prev = vertices.clone();
        for (i, vertex) in vertices.iter_mut().enumerate() {
            if neighbors[i].is_empty() {
                continue;
            }
            let mut centroid = Point3::origin();
            for &j in &neighbors[i] {
                centroid += prev[j].coords;
            }
            centroid /= neighbors[i].len() as f64;

            let displacement = centroid - prev[i];
            *vertex = prev[i] + displacement * params.lambda;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vertices() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
        ]
    }

    #[test]
    fn zero_lambda_is_identity() {
        let mut v = sample_vertices();
        let orig = v.clone();
        let faces = vec![[0, 1, 2], [1, 2, 3]];
        laplacian_smooth(
            &mut v,
            &faces,
            &SmoothingParams {
                lambda: 0.0,
                iterations: 7,
            },
        );
        assert_eq!(v, orig);
    }

    #[test]
    fn zero_iterations_is_identity() {
        let mut v = sample_vertices();
        let orig = v.clone();
        let faces = vec![[0, 1, 2]];
        laplacian_smooth(
            &mut v,
            &faces,
            &SmoothingParams {
                lambda: 0.9,
                iterations: 0,
            },
        );
        assert_eq!(v, orig);
    }

    #[test]
    fn neighborless_vertex_never_moves() {
        let mut v = sample_vertices();
        // Vertex 3 appears in no face.
        let faces = vec![[0, 1, 2]];
        laplacian_smooth(&mut v, &faces, &SmoothingParams::default());
        assert_eq!(v[3], Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn shared_edge_neighbors_count_twice() {
        // Faces [0,1,2] and [0,1,3]: vertex 0 sees 1 twice (once per face)
        // and 2, 3 once each. With lambda = 1 and one iteration the new
        // position is exactly (2·v1 + v2 + v3) / 4.
        let v0 = Point3::new(0.0, 0.0, 0.0);
        let v1 = Point3::new(4.0, 0.0, 0.0);
        let v2 = Point3::new(0.0, 4.0, 0.0);
        let v3 = Point3::new(0.0, 0.0, 4.0);
        let mut v = vec![v0, v1, v2, v3];
        let faces = vec![[0, 1, 2], [0, 1, 3]];

        laplacian_smooth(
            &mut v,
            &faces,
            &SmoothingParams {
                lambda: 1.0,
                iterations: 1,
            },
        );

        let expected = Point3::new((2.0 * 4.0) / 4.0, 4.0 / 4.0, 4.0 / 4.0);
        assert!((v[0] - expected).norm() < 1e-12, "got {}", v[0]);
    }

    #[test]
    fn iterations_read_previous_round() {
        // Two vertices tied through one (degenerate) face converge toward
        // each other symmetrically; an in-place update would break symmetry.
        let mut v = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2]];
        laplacian_smooth(
            &mut v,
            &faces,
            &SmoothingParams {
                lambda: 0.5,
                iterations: 1,
            },
        );
        // v0 and v1 averaged their (pre-update) neighbors: mirror images in x.
        assert!((v[0].x + v[1].x - 1.0).abs() < 1e-12);
        assert!((v[0].y - v[1].y).abs() < 1e-12);
    }
}
