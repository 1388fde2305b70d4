//! Surface appearance for the raytracer.

use glam::Vec3;

/// Color type alias (linear RGB, typically 0-1)
pub type Color = Vec3;

/// A Phong material with reflection and refraction terms.
///
/// Materials are owned by whoever loads the meshes and shared with
/// triangles through `Arc<Material>`; the renderer never mutates them.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Material name (from the MTL file, may be empty)
    pub name: String,

    /// Ambient reflectance
    pub ambient: Color,

    /// Diffuse reflectance
    pub diffuse: Color,

    /// Specular reflectance
    pub specular: Color,

    /// Emitted radiance (non-black for light sources)
    pub emissive: Color,

    /// Phong exponent
    pub shininess: f32,

    /// Mirror weight (0 = none, 1 = perfect mirror)
    pub reflectivity: f32,

    /// Transmission weight (0 = opaque, 1 = fully transparent)
    pub transparency: f32,

    /// Index of refraction (1.0 = air, 1.5 = glass)
    pub index_of_refraction: f32,

    /// Path to diffuse texture
    pub texture: Option<String>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: Color::splat(0.5),
            diffuse: Color::splat(0.5),
            specular: Color::splat(0.5),
            emissive: Color::ZERO,
            shininess: 1.0,
            reflectivity: 0.0,
            transparency: 0.0,
            index_of_refraction: 1.0,
            texture: None,
        }
    }
}

impl Material {
    /// Create a Phong material without reflection or refraction.
    pub fn phong(
        ambient: Color,
        diffuse: Color,
        specular: Color,
        emissive: Color,
        shininess: f32,
    ) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            emissive,
            shininess,
            ..Default::default()
        }
    }

    /// Create a pure emitter.
    pub fn emitter(name: impl Into<String>, emissive: Color) -> Self {
        Self {
            name: name.into(),
            ambient: Color::ZERO,
            diffuse: Color::ZERO,
            specular: Color::ZERO,
            emissive,
            ..Default::default()
        }
    }

    /// Set the mirror weight, clamped to [0, 1].
    pub fn with_reflectivity(mut self, reflectivity: f32) -> Self {
        self.reflectivity = reflectivity.clamp(0.0, 1.0);
        self
    }

    /// Set the transmission weight (clamped to [0, 1]) and index of refraction.
    pub fn with_refraction(mut self, transparency: f32, ior: f32) -> Self {
        self.transparency = transparency.clamp(0.0, 1.0);
        self.index_of_refraction = ior;
        self
    }

    /// A material acts as a light source when it emits.
    pub fn is_light(&self) -> bool {
        self.emissive.max_element() > 0.0
    }
}
