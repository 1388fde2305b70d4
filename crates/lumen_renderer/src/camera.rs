//! Primary ray generation.

use lumen_math::{Ray, Vec3};

/// Pinhole camera at the view-space origin looking down +Z.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    width: u32,
    height: u32,
    /// Full field of view in radians
    fov: f32,
    orthographic: bool,
}

impl Camera {
    /// Create a perspective camera for a width x height viewport.
    pub fn new(width: u32, height: u32, fov: f32) -> Self {
        Self {
            width,
            height,
            fov,
            orthographic: false,
        }
    }

    /// Switch between orthographic and perspective projection.
    pub fn with_orthographic(mut self, orthographic: bool) -> Self {
        self.orthographic = orthographic;
        self
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Primary ray for a pixel in the configured projection.
    pub fn ray(&self, x: u32, y: u32) -> Ray {
        self.calculate_ray(x, y, !self.orthographic)
    }

    /// Primary ray for a pixel.
    ///
    /// Pixel coordinates map to NDC in [-1, 1) with row 0 at the bottom.
    /// Perspective rays start at the origin with an unnormalized direction
    /// through the image plane at z = 1. Orthographic rays start on the
    /// z = 0 plane and point down +Z, with the wider axis stretched by the
    /// aspect ratio.
    pub fn calculate_ray(&self, x: u32, y: u32, perspective: bool) -> Ray {
        let x_ndc = (x as f32 / self.width as f32 - 0.5) * 2.0;
        let y_ndc = (y as f32 / self.height as f32 - 0.5) * 2.0;
        let aspect = self.aspect();

        if perspective {
            let scale = (self.fov / 2.0).tan();
            Ray::primary(
                Vec3::ZERO,
                Vec3::new(x_ndc * aspect * scale, y_ndc * scale, 1.0),
            )
        } else {
            let (ox, oy) = if aspect > 1.0 {
                (x_ndc * aspect, y_ndc)
            } else {
                (x_ndc, y_ndc / aspect)
            };
            Ray::primary(Vec3::new(ox, oy, 0.0), Vec3::Z)
        }
    }
}
