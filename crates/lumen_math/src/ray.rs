use crate::Vec3;

/// Whether a ray leaves the camera or is spawned while shading a hit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RayKind {
    /// Cast from the camera through a pixel.
    #[default]
    Primary,
    /// Shadow, reflection or refraction ray.
    Secondary,
}

/// A ray in 3D space with origin, direction, and kind.
///
/// The direction is not required to be unit length; intersection
/// parameters are expressed in multiples of it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub kind: RayKind,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3, kind: RayKind) -> Self {
        Self {
            origin,
            direction,
            kind,
        }
    }

    /// A camera ray.
    pub fn primary(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin, direction, RayKind::Primary)
    }

    /// A ray spawned during shading.
    pub fn secondary(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin, direction, RayKind::Secondary)
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn is_primary(&self) -> bool {
        self.kind == RayKind::Primary
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
