use nalgebra::Point3;
use tracing::debug;

const STD_FLOOR: f64 = 1e-8;

/// Drop points whose z-score exceeds `threshold` on any axis.
///
/// Mean and standard deviation are computed per axis over all points
/// (population std); the std is floored at 1e-8 so a constant axis never
/// divides by zero. Surviving points keep their relative order.
pub fn remove_outliers(points: &[Point3<f64>], threshold: f64) -> Vec<Point3<f64>> {
    if points.is_empty() {
        return Vec::new();
    }

    let n = points.len() as f64;
    let mut mean = [0.0f64; 3];
    for p in points {
        mean[0] += p.x;
        mean[1] += p.y;
        mean[2] += p.z;
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut var = [0.0f64; 3];
    for p in points {
        var[0] += (p.x - mean[0]).powi(2);
        var[1] += (p.y - mean[1]).powi(2);
        var[2] += (p.z - mean[2]).powi(2);
    }
    let std: Vec<f64> = var.iter().map(|v| (v / n).sqrt().max(STD_FLOOR)).collect();

    let kept: Vec<Point3<f64>> = points
        .iter()
        .filter(|p| {
            let zx = (p.x - mean[0]).abs() / std[0];
            let zy = (p.y - mean[1]).abs() / std[1];
            let zz = (p.z - mean[2]).abs() / std[2];
            zx <= threshold && zy <= threshold && zz <= threshold
        })
        .copied()
        .collect();

    debug!(
        before = points.len(),
        after = kept.len(),
        "statistical outlier filtering"
    );
    kept
}
