//! Multi-view 3D face reconstruction.
//!
//! Thin facade over the member crates: feature matching, relative pose
//! recovery, landmark triangulation, mesh construction, texture projection,
//! and the request-level pipeline.

pub use recon_core as core;
pub use recon_features as features;
pub use recon_hal as hal;
pub use recon_mesh as mesh;
pub use recon_pipeline as pipeline;
pub use recon_sfm as sfm;
