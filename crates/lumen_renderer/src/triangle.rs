//! View-space triangles with per-corner attributes.

use std::f32::consts::PI;
use std::sync::Arc;

use lumen_core::{Color, Material};
use lumen_math::{Homogeneous4, Ray, Vec2, Vec3};

use crate::scene::NO_HIT;

/// Rays closer than this to the plane (cosine of the angle) count as parallel.
const PARALLEL_EPSILON: f32 = 1e-5;

/// A triangle ready for ray queries.
///
/// Positions and normals are homogeneous (w = 1 and w = 0) and already in
/// view space. A triangle is valid once the scene has assigned it an id.
#[derive(Clone, Debug)]
pub struct Triangle {
    id: Option<usize>,
    pub verts: [Homogeneous4; 3],
    pub normals: [Homogeneous4; 3],
    pub uvs: [Vec2; 3],
    material: Arc<Material>,
}

impl Default for Triangle {
    fn default() -> Self {
        Self {
            id: None,
            verts: [Homogeneous4::ZERO; 3],
            normals: [Homogeneous4::ZERO; 3],
            uvs: [Vec2::ZERO; 3],
            material: Arc::new(Material::default()),
        }
    }
}

impl Triangle {
    /// Create an unvalidated triangle from view-space corners.
    pub fn new(positions: [Vec3; 3], normals: [Vec3; 3], uvs: [Vec2; 3], material: Arc<Material>) -> Self {
        Self::from_homogeneous(
            positions.map(Homogeneous4::from_point),
            normals.map(Homogeneous4::from_vector),
            uvs,
            material,
        )
    }

    /// Create an unvalidated triangle from already transformed corners.
    pub fn from_homogeneous(
        verts: [Homogeneous4; 3],
        normals: [Homogeneous4; 3],
        uvs: [Vec2; 3],
        material: Arc<Material>,
    ) -> Self {
        Self {
            id: None,
            verts,
            normals,
            uvs,
            material,
        }
    }

    /// Mark the triangle as part of a scene.
    pub fn validate(&mut self, id: usize) {
        self.id = Some(id);
    }

    pub fn is_valid(&self) -> bool {
        self.id.is_some()
    }

    /// Position in the scene's triangle list, if validated.
    pub fn id(&self) -> Option<usize> {
        self.id
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Corner positions as 3D points.
    pub fn positions(&self) -> [Vec3; 3] {
        self.verts.map(|v| v.point())
    }

    /// Ray parameter of the hit, or a non-positive value on a miss.
    ///
    /// The hit point is projected into an orthonormal basis of the plane
    /// and tested against the three edge half-planes there, so the result
    /// does not depend on winding.
    pub fn intersect(&self, ray: &Ray) -> f32 {
        let [v0, v1, v2] = self.positions();
        let u = (v1 - v0).normalize();
        let normal = u.cross((v2 - v0).normalize()).normalize();
        let w = normal.cross(u).normalize();

        let denom = ray.direction.dot(normal);
        if denom.abs() <= PARALLEL_EPSILON * ray.direction.length() {
            return NO_HIT;
        }

        let t = (v0 - ray.origin).dot(normal) / denom;
        if t > 0.0 {
            let to_plane = |p: Vec3| {
                let d = p - v0;
                Vec2::new(d.dot(u), d.dot(w))
            };
            let p = to_plane(ray.at(t));
            let corners = [Vec2::ZERO, to_plane(v1), to_plane(v2)];

            for i in 0..3 {
                let start = corners[i];
                let end = corners[(i + 1) % 3];
                if (p - start).dot((end - start).perp()) < 0.0 {
                    return NO_HIT;
                }
            }
        }

        t
    }

    /// Barycentric coordinates of a point from sub-triangle area ratios.
    ///
    /// Exact for points inside the triangle; outside it the weights no
    /// longer sum to 1.
    pub fn barycentric(&self, point: Vec3) -> Vec3 {
        let [a, b, c] = self.positions();
        let area = (b - a).cross(a - c).length();
        let alpha = (c - b).cross(point - b).length() / area;
        let beta = (a - c).cross(point - c).length() / area;
        let gamma = (b - a).cross(point - a).length() / area;
        Vec3::new(alpha, beta, gamma)
    }

    /// Interpolated unit normal.
    pub fn interpolated_normal(&self, bc: Vec3) -> Vec3 {
        (self.normals[0].vector() * bc.x
            + self.normals[1].vector() * bc.y
            + self.normals[2].vector() * bc.z)
            .normalize_or_zero()
    }

    /// Interpolated position.
    pub fn interpolated_position(&self, bc: Vec3) -> Vec3 {
        let [a, b, c] = self.positions();
        a * bc.x + b * bc.y + c * bc.z
    }

    /// Interpolated texture coordinate.
    pub fn interpolated_uv(&self, bc: Vec3) -> Vec2 {
        self.uvs[0] * bc.x + self.uvs[1] * bc.y + self.uvs[2] * bc.z
    }

    /// Blinn-Phong shading for one light, clamped to [0, 1].
    ///
    /// The specular lobe is energy normalised by (shininess + 2) / 2pi and
    /// weighted by the diffuse cosine. The eye sits at the view-space origin.
    pub fn phong_shading(&self, light_position: Vec3, light_color: Color, bc: Vec3) -> Color {
        let material = &self.material;
        let normal = self.interpolated_normal(bc);
        let position = self.interpolated_position(bc);

        let to_light = (light_position - position).normalize_or_zero();
        let cos_theta = normal.dot(to_light).clamp(0.0, 1.0);

        let ambient = material.ambient * light_color;
        let diffuse = material.diffuse * light_color * cos_theta;

        let to_eye = (-position).normalize_or_zero();
        let halfway = (to_light + to_eye).normalize_or_zero();
        let cos_b = normal
            .dot(halfway)
            .clamp(0.0, 1.0)
            .powf(material.shininess)
            .clamp(0.0, 1.0);
        let weight = cos_b * cos_theta * (material.shininess + 2.0) / (2.0 * PI);
        let specular = material.specular * light_color * weight;

        crate::color::clamp_color(ambient + diffuse + specular)
    }

    /// Shading for a point that cannot see the light: ambient only.
    pub fn shadow_shading(&self, light_color: Color) -> Color {
        crate::color::clamp_color(self.material.ambient * light_color)
    }
}
