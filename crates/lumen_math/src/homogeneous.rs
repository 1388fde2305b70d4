//! Homogeneous 4-component points and vectors.
//!
//! Points carry `w = 1`, directions carry `w = 0`, so the same 4x4
//! transform moves points and leaves directions untranslated.

use std::ops::{Add, Mul, Sub};

use glam::{Vec3, Vec4};

use crate::MathError;

/// A homogeneous coordinate `(x, y, z, w)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Homogeneous4(pub Vec4);

impl Homogeneous4 {
    pub const ZERO: Self = Self(Vec4::ZERO);

    /// Create from explicit components.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self(Vec4::new(x, y, z, w))
    }

    /// A position (w = 1).
    #[inline]
    pub fn from_point(p: Vec3) -> Self {
        Self(p.extend(1.0))
    }

    /// A direction (w = 0), unaffected by translation.
    #[inline]
    pub fn from_vector(v: Vec3) -> Self {
        Self(v.extend(0.0))
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.0.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.0.y
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.0.z
    }

    #[inline]
    pub fn w(&self) -> f32 {
        self.0.w
    }

    /// Perspective divide into a 3D point.
    ///
    /// A zero `w` means the value is a direction; its xyz part is
    /// returned unchanged.
    #[inline]
    pub fn point(&self) -> Vec3 {
        if self.0.w == 0.0 {
            self.0.truncate()
        } else {
            self.0.truncate() / self.0.w
        }
    }

    /// The xyz part, ignoring `w`.
    #[inline]
    pub fn vector(&self) -> Vec3 {
        self.0.truncate()
    }

    /// Component by index (0 = x .. 3 = w).
    pub fn get(&self, index: usize) -> Result<f32, MathError> {
        match index {
            0 => Ok(self.0.x),
            1 => Ok(self.0.y),
            2 => Ok(self.0.z),
            3 => Ok(self.0.w),
            _ => Err(MathError::IndexOutOfRange { index, len: 4 }),
        }
    }

    /// Mutable component by index (0 = x .. 3 = w).
    pub fn get_mut(&mut self, index: usize) -> Result<&mut f32, MathError> {
        match index {
            0 => Ok(&mut self.0.x),
            1 => Ok(&mut self.0.y),
            2 => Ok(&mut self.0.z),
            3 => Ok(&mut self.0.w),
            _ => Err(MathError::IndexOutOfRange { index, len: 4 }),
        }
    }
}

impl From<Vec4> for Homogeneous4 {
    fn from(v: Vec4) -> Self {
        Self(v)
    }
}

impl From<Homogeneous4> for Vec4 {
    fn from(h: Homogeneous4) -> Self {
        h.0
    }
}

impl Add for Homogeneous4 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Homogeneous4 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f32> for Homogeneous4 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self(self.0 * rhs)
    }
}

impl Mul<Homogeneous4> for f32 {
    type Output = Homogeneous4;

    fn mul(self, rhs: Homogeneous4) -> Homogeneous4 {
        Homogeneous4(rhs.0 * self)
    }
}
