//! Lumen Core - scene description types for the raytracer.
//!
//! This crate provides:
//!
//! - **Geometry**: `Model`, a polygon soup with separate position,
//!   normal and texture coordinate tables
//! - **Appearance**: `Material` (Phong + reflection/refraction terms)
//! - **Lighting**: `Light` and discovery of lights from emissive models
//! - **Configuration**: `RenderOptions` (serde, JSON) and `RenderSettings`
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{find_lights, RenderOptions, RenderSettings};
//!
//! let options = RenderOptions::load("render.json")?;
//! let lights = find_lights(&models);
//! let settings = RenderSettings::new(options, lights);
//! ```

pub mod light;
pub mod material;
pub mod mesh;
pub mod settings;

// Re-export commonly used types
pub use light::{find_lights, Light, LightKind};
pub use material::{Color, Material};
pub use mesh::{Face, MeshError, Model};
pub use settings::{ConfigError, RenderOptions, RenderSettings, Schedule, ShadingMode};
