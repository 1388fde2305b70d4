// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod error;
mod homogeneous;
mod ray;
mod transform;

pub use error::MathError;
pub use homogeneous::Homogeneous4;
pub use ray::{Ray, RayKind};
pub use transform::Mat4Ext;
