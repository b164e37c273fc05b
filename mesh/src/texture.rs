//! Texture atlas projection and UV coordinates.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::RgbImage;
use nalgebra::{Point2, Point3};
use recon_core::CameraPose;
use tracing::debug;

use crate::{MeshError, Result};

pub const ATLAS_SIZE: u32 = 1024;

const SPAN_FLOOR: f64 = 1e-8;

/// Builds a sparse point-sampled texture atlas.
///
/// Every vertex is projected into the first source image with that camera's
/// K, R, t; projected coordinates are min-max normalized into the atlas, and
/// the normalized coordinate indexes both the atlas and the source image.
/// A vertex only contributes when it lands inside both. No rasterization or
/// blending: gaps stay black.
#[derive(Debug, Clone)]
pub struct TextureAtlasBuilder {
    pub size: u32,
}

impl Default for TextureAtlasBuilder {
    fn default() -> Self {
        Self { size: ATLAS_SIZE }
    }
}

impl TextureAtlasBuilder {
    pub fn build(
        &self,
        images: &[RgbImage],
        vertices: &[Point3<f64>],
        pose: &CameraPose,
    ) -> RgbImage {
        // ImageBuffer::new zero-fills: black canvas.
        let mut atlas = RgbImage::new(self.size, self.size);

        let Some(source) = images.first() else {
            return atlas;
        };

        let projected: Vec<Point2<f64>> = vertices
            .iter()
            .filter_map(|v| pose.project(v))
            .collect();
        if projected.is_empty() {
            debug!("no vertex projected in front of the camera, atlas left blank");
            return atlas;
        }

        let mut min = projected[0];
        let mut max = projected[0];
        for p in &projected {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        let span_x = (max.x - min.x).max(SPAN_FLOOR);
        let span_y = (max.y - min.y).max(SPAN_FLOOR);

        let extent = (self.size - 1) as f64;
        let mut sampled = 0usize;
        for p in &projected {
            let u = ((p.x - min.x) / span_x * extent) as i64;
            let v = ((p.y - min.y) / span_y * extent) as i64;

            let in_atlas = u >= 0 && u < self.size as i64 && v >= 0 && v < self.size as i64;
            let in_source = u >= 0 && u < source.width() as i64 && v >= 0 && v < source.height() as i64;
            if in_atlas && in_source {
                let (u, v) = (u as u32, v as u32);
                atlas.put_pixel(u, v, *source.get_pixel(u, v));
                sampled += 1;
            }
        }
        debug!(vertices = vertices.len(), sampled, "texture atlas sampled");

        atlas
    }
}

/// Planar UV coordinates: vertex (x, y) min-max normalized into [0, 1].
pub fn planar_uv_coordinates(vertices: &[Point3<f64>]) -> Vec<(f64, f64)> {
    if vertices.is_empty() {
        return Vec::new();
    }

    let mut min = (vertices[0].x, vertices[0].y);
    let mut max = min;
    for v in vertices {
        min.0 = min.0.min(v.x);
        min.1 = min.1.min(v.y);
        max.0 = max.0.max(v.x);
        max.1 = max.1.max(v.y);
    }
    let span_x = (max.0 - min.0).max(SPAN_FLOOR);
    let span_y = (max.1 - min.1).max(SPAN_FLOOR);

    vertices
        .iter()
        .map(|v| ((v.x - min.0) / span_x, (v.y - min.1) / span_y))
        .collect()
}

/// Encode an image as a base64 PNG payload string.
pub fn encode_png_base64(image: &RgbImage) -> Result<String> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| MeshError::TextureEncoding(e.to_string()))?;
    Ok(STANDARD.encode(buf.into_inner()))
}
