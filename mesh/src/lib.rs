//! Mesh construction from a sparse triangulated point cloud: statistical
//! outlier filtering, planar Delaunay connectivity, Laplacian smoothing,
//! and texture projection.

pub mod delaunay;
pub mod filtering;
pub mod processing;
pub mod texture;

pub use delaunay::triangulate_planar;
pub use filtering::remove_outliers;
pub use processing::{laplacian_smooth, SmoothingParams};
pub use texture::{encode_png_base64, planar_uv_coordinates, TextureAtlasBuilder, ATLAS_SIZE};

use nalgebra::Point3;

pub type Result<T> = std::result::Result<T, MeshError>;

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("Texture encoding failed: {0}")]
    TextureEncoding(String),
}

/// Triangle mesh: vertex positions plus triangular face indices.
///
/// Invariant: every face index is `< vertices.len()`. Vertex order is stable
/// across filtering and smoothing, so faces stay valid through both.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<[usize; 3]>,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }
}

/// Stage parameters for mesh construction.
#[derive(Debug, Clone)]
pub struct MeshParams {
    /// Z-score above which a point is dropped on any axis.
    pub outlier_threshold: f64,
    pub smoothing: SmoothingParams,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            outlier_threshold: 2.0,
            smoothing: SmoothingParams::default(),
        }
    }
}

/// Connectivity needs at least this many points for a 2D triangulation.
pub const MIN_MESH_POINTS: usize = 4;
