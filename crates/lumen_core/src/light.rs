//! Light sources and their discovery from emissive models.

use std::f32::consts::PI;

use glam::Vec3;
use rand::Rng;

use crate::material::Color;
use crate::mesh::Model;

/// Radius of the sphere a point light's samples are drawn from.
pub const POINT_LIGHT_RADIUS: f32 = 0.01;

/// Kind of light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Directional,
    /// A parallelogram spanned by two tangents around the center
    Area,
}

/// A light in model space.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Color,
    /// Center position (direction for directional lights)
    pub position: Vec3,
    /// Facing direction (area lights) or travel direction (directional)
    pub direction: Vec3,
    pub tangent1: Vec3,
    pub tangent2: Vec3,
}

impl Light {
    /// A point light.
    pub fn point(position: Vec3, color: Color) -> Self {
        Self {
            kind: LightKind::Point,
            color,
            position,
            direction: Vec3::ZERO,
            tangent1: Vec3::ZERO,
            tangent2: Vec3::ZERO,
        }
    }

    /// A directional light.
    pub fn directional(direction: Vec3, color: Color) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            position: Vec3::ZERO,
            direction,
            tangent1: Vec3::ZERO,
            tangent2: Vec3::ZERO,
        }
    }

    /// An area light spanned by `tangent1` and `tangent2` around `center`.
    pub fn area(center: Vec3, normal: Vec3, tangent1: Vec3, tangent2: Vec3, color: Color) -> Self {
        Self {
            kind: LightKind::Area,
            color,
            position: center,
            direction: normal,
            tangent1,
            tangent2,
        }
    }

    /// Deterministic position used for shading and hard shadows.
    pub fn position_center(&self) -> Vec3 {
        self.position
    }

    /// A stochastic position on the light.
    ///
    /// Area lights sample their parallelogram uniformly, point lights
    /// sample a small sphere, directional lights return their direction.
    pub fn sample_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match self.kind {
            LightKind::Directional => self.direction,
            LightKind::Area => {
                let u = rng.gen::<f32>() - 0.5;
                let v = rng.gen::<f32>() - 0.5;
                self.position + u * self.tangent1 + v * self.tangent2
            }
            LightKind::Point => {
                let theta = 2.0 * PI * rng.gen::<f32>();
                let phi = 2.0 * PI * rng.gen::<f32>();
                let r = POINT_LIGHT_RADIUS * rng.gen::<f32>();
                self.position
                    + r * Vec3::new(
                        phi.cos() * theta.sin(),
                        phi.sin() * theta.sin(),
                        theta.cos(),
                    )
            }
        }
    }
}

/// Derive lights from models with emissive materials.
///
/// A model made of exactly two triangles is read as a rectangular area
/// light: the corner of the first triangle that the second does not share
/// is the rectangle's corner, and the two edges leaving it are the
/// tangents. Every other emissive model becomes a point light at the
/// centroid of its vertices.
pub fn find_lights(models: &[Model]) -> Vec<Light> {
    let mut lights = Vec::new();

    for model in models {
        let Some(material) = model.material.as_ref().filter(|m| m.is_light()) else {
            continue;
        };

        match area_light(model, material.emissive) {
            Some(light) => lights.push(light),
            None => lights.push(Light::point(model.centroid(), material.emissive)),
        }
    }

    log::debug!("Found {} lights in {} models", lights.len(), models.len());
    lights
}

fn area_light(model: &Model, color: Color) -> Option<Light> {
    let [first, second] = model.faces.as_slice() else {
        return None;
    };
    if first.len() != 3 || second.len() != 3 {
        return None;
    }

    let i = (0..3).find(|&i| !second.vertices.contains(&first.vertices[i]))?;
    let v1 = *model.vertices.get(first.vertices[i] as usize)?;
    let v2 = *model.vertices.get(first.vertices[(i + 1) % 3] as usize)?;
    let v3 = *model.vertices.get(first.vertices[(i + 2) % 3] as usize)?;

    let tangent1 = v2 - v1;
    let tangent2 = v3 - v1;
    let center = v1 + tangent1 / 2.0 + tangent2 / 2.0;
    let normal = first
        .normals
        .first()
        .and_then(|&n| model.normals.get(n as usize).copied())
        .unwrap_or_else(|| tangent1.cross(tangent2).normalize_or_zero());

    Some(Light::area(center, normal, tangent1, tangent2, color))
}
