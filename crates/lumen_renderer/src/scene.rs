//! Flat view-space triangle list built from models.

use std::sync::Arc;

use lumen_core::{Material, Model};
use lumen_math::{Homogeneous4, Mat4, Mat4Ext, Ray};

use crate::triangle::Triangle;

/// Ray parameter reported when nothing is hit.
pub const NO_HIT: f32 = -1.0;

/// A hit counts when its parameter is above this value.
pub const HIT_THRESHOLD: f32 = -0.01;

/// Result of a nearest-hit query.
#[derive(Clone, Copy, Debug)]
pub struct CollisionInfo<'a> {
    pub triangle: Option<&'a Triangle>,
    pub t: f32,
}

impl<'a> CollisionInfo<'a> {
    /// No triangle along the ray.
    pub fn miss() -> Self {
        Self {
            triangle: None,
            t: NO_HIT,
        }
    }

    /// The hit triangle when the query found one.
    pub fn hit(&self) -> Option<&'a Triangle> {
        self.triangle.filter(|_| self.t > HIT_THRESHOLD)
    }

    pub fn is_hit(&self) -> bool {
        self.hit().is_some()
    }
}

/// Triangles in view space, rebuilt before each pass.
#[derive(Clone, Debug)]
pub struct Scene {
    triangles: Vec<Triangle>,
    modelview: Mat4,
    default_material: Arc<Material>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            triangles: Vec::new(),
            modelview: Mat4::IDENTITY,
            default_material: Arc::new(Material::default()),
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from triangles already in view space.
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        let mut scene = Self::default();
        for triangle in triangles {
            scene.push(triangle);
        }
        scene
    }

    /// Material for models that carry none.
    pub fn with_default_material(mut self, material: Arc<Material>) -> Self {
        self.default_material = material;
        self
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The transform the triangles were built with.
    pub fn modelview(&self) -> Mat4 {
        self.modelview
    }

    fn push(&mut self, mut triangle: Triangle) {
        triangle.validate(self.triangles.len());
        self.triangles.push(triangle);
    }

    /// Rebuild the triangle list from models.
    ///
    /// Faces are fan-triangulated from their first corner. Corners without
    /// a normal take the triangle's geometric normal. Faces with bad
    /// indices are skipped with a warning. Returns the triangle count.
    pub fn update(&mut self, models: &[Model], modelview: Mat4) -> usize {
        self.triangles.clear();
        self.modelview = modelview;
        let mut skipped = 0;

        for model in models {
            let material = model
                .material
                .clone()
                .unwrap_or_else(|| Arc::clone(&self.default_material));

            for face_index in 0..model.faces.len() {
                let corners = match model.face_triangles(face_index) {
                    Ok(corners) => corners,
                    Err(e) => {
                        log::warn!("Skipping face in model '{}': {}", model.name, e);
                        skipped += 1;
                        continue;
                    }
                };

                for [c0, c1, c2] in corners {
                    let flat = (c1.position - c0.position)
                        .cross(c2.position - c0.position)
                        .normalize_or_zero();

                    let corners = [c0, c1, c2];
                    self.push(Triangle::from_homogeneous(
                        corners.map(|c| modelview.transform_homogeneous(Homogeneous4::from_point(c.position))),
                        corners.map(|c| {
                            modelview.transform_homogeneous(Homogeneous4::from_vector(c.normal.unwrap_or(flat)))
                        }),
                        corners.map(|c| c.uv),
                        Arc::clone(&material),
                    ));
                }
            }
        }

        if skipped > 0 {
            log::warn!("Skipped {} malformed faces", skipped);
        }
        log::debug!(
            "Scene rebuilt: {} triangles from {} models",
            self.triangles.len(),
            models.len()
        );
        self.triangles.len()
    }

    /// Nearest triangle with a positive ray parameter.
    pub fn closest_triangle(&self, ray: &Ray) -> CollisionInfo<'_> {
        let mut closest = CollisionInfo::miss();
        let mut min_t = f32::INFINITY;

        for triangle in &self.triangles {
            let t = triangle.intersect(ray);
            if t > 0.0 && t < min_t {
                min_t = t;
                closest = CollisionInfo {
                    triangle: Some(triangle),
                    t,
                };
            }
        }

        closest
    }
}
