// Transform utilities for Mat4
//
// Extends glam::Mat4 with the point/normal conventions used to move
// models into view space.

use glam::Mat4;

use crate::Homogeneous4;

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform a homogeneous coordinate, keeping its `w`.
    fn transform_homogeneous(&self, h: Homogeneous4) -> Homogeneous4;
}

impl Mat4Ext for Mat4 {
    fn transform_homogeneous(&self, h: Homogeneous4) -> Homogeneous4 {
        Homogeneous4(*self * h.0)
    }
}
