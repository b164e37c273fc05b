//! Hardware acceleration layer.
//!
//! Exposes an availability probe and accelerated variants of the heavy
//! pipeline stages. An accelerated variant either returns a fully valid
//! result ([`Accelerated::Ready`]) or declines the work
//! ([`Accelerated::Unavailable`]); partial output is never produced, and
//! callers fall back to the CPU reference path silently.

pub mod gpu;

pub use gpu::GpuContext;

use nalgebra::{Matrix3x4, Point2, Point3};
use tracing::debug;

/// Outcome of an accelerated variant.
#[derive(Debug)]
pub enum Accelerated<T> {
    /// A complete result, interchangeable with the CPU reference path's.
    Ready(T),
    /// The accelerator declined; run the reference path.
    Unavailable,
}

impl<T> Accelerated<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Accelerated::Ready(v) => Some(v),
            Accelerated::Unavailable => None,
        }
    }
}

/// Whether a usable GPU adapter and device can be acquired right now.
pub fn is_gpu_available() -> bool {
    GpuContext::new().is_some()
}

/// Accelerated two-view DLT triangulation.
///
/// The pipeline's geometry is f64 and WGSL exposes no 64-bit floats; an f32
/// round-trip would not be interchangeable with the reference path, so after
/// probing the device this declines and the CPU path stays authoritative.
pub fn accelerate_triangulation(
    landmark_sets: &[Vec<Point2<f64>>],
    projections: &[Matrix3x4<f64>],
) -> Accelerated<Vec<Point3<f64>>> {
    let Some(_ctx) = GpuContext::new() else {
        return Accelerated::Unavailable;
    };
    debug!(
        sets = landmark_sets.len(),
        cameras = projections.len(),
        "gpu adapter present, no f64 triangulation kernel; declining"
    );
    Accelerated::Unavailable
}

/// Accelerated Laplacian smoothing. Same f64 constraint as triangulation:
/// smoothing with `lambda = 0` must be bit-identical, which an f32 kernel
/// cannot guarantee, so this declines after the probe.
pub fn accelerate_smoothing(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
    lambda: f64,
    iterations: usize,
) -> Accelerated<Vec<Point3<f64>>> {
    let Some(_ctx) = GpuContext::new() else {
        return Accelerated::Unavailable;
    };
    debug!(
        vertices = vertices.len(),
        faces = faces.len(),
        lambda,
        iterations,
        "gpu adapter present, no f64 smoothing kernel; declining"
    );
    Accelerated::Unavailable
}
