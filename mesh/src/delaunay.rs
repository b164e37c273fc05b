//! 2D Delaunay triangulation (Bowyer–Watson incremental insertion).

use nalgebra::Point2;

struct Triangle {
    v: [usize; 3],
    center: Point2<f64>,
    radius2: f64,
}

/// Circumcircle of a triangle; `None` when the vertices are collinear.
fn circumcircle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Option<(Point2<f64>, f64)> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-12 {
        return None;
    }
    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    let center = Point2::new(ux, uy);
    let radius2 = (a - center).norm_squared();
    Some((center, radius2))
}

/// Delaunay triangulation of a planar point set.
///
/// Degenerate inputs (fewer than 3 points, all points collinear or
/// coincident) produce no triangles rather than an error; callers treat an
/// empty face list as "no mesh".
pub fn triangulate_planar(points: &[Point2<f64>]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    // Super-triangle comfortably enclosing the input.
    let mut min = points[0];
    let mut max = points[0];
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    let dmax = (max.x - min.x).max(max.y - min.y).max(1.0);
    let mid = Point2::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);

    let mut verts: Vec<Point2<f64>> = points.to_vec();
    verts.push(Point2::new(mid.x - 20.0 * dmax, mid.y - dmax));
    verts.push(Point2::new(mid.x, mid.y + 20.0 * dmax));
    verts.push(Point2::new(mid.x + 20.0 * dmax, mid.y - dmax));

    let mut triangles: Vec<Triangle> = Vec::new();
    if let Some((center, radius2)) = circumcircle(&verts[n], &verts[n + 1], &verts[n + 2]) {
        triangles.push(Triangle {
            v: [n, n + 1, n + 2],
            center,
            radius2,
        });
    }

    for p in 0..n {
        let pt = verts[p];

        let (bad, good): (Vec<Triangle>, Vec<Triangle>) = triangles
            .drain(..)
            .partition(|t| (pt - t.center).norm_squared() < t.radius2);
        triangles = good;

        // Duplicate of an already-inserted point: inside no circumcircle.
        if bad.is_empty() {
            continue;
        }

        // Boundary of the cavity: edges belonging to exactly one bad triangle.
        let mut edges: Vec<((usize, usize), u32)> = Vec::new();
        for t in &bad {
            for i in 0..3 {
                let a = t.v[i];
                let b = t.v[(i + 1) % 3];
                let key = (a.min(b), a.max(b));
                match edges.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, count)) => *count += 1,
                    None => edges.push((key, 1)),
                }
            }
        }

        for ((a, b), count) in edges {
            if count != 1 {
                continue;
            }
            if let Some((center, radius2)) = circumcircle(&verts[a], &verts[b], &pt) {
                triangles.push(Triangle {
                    v: [a, b, p],
                    center,
                    radius2,
                });
            }
        }
    }

    triangles
        .into_iter()
        .map(|t| t.v)
        .filter(|v| v.iter().all(|&i| i < n))
        .collect()
}
