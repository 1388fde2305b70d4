//! Render configuration.
//!
//! `RenderOptions` is the serializable part (feature toggles, camera and
//! model placement, quality knobs) and is usually read from a JSON file.
//! `RenderSettings` adds the light list and the transforms the engine
//! queries while rendering.

use std::path::Path;

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::light::Light;

/// Errors that can occur while loading render options.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid option `{field}`: {message}")]
    Invalid { field: &'static str, message: String },
}

/// How each pixel of a pass is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingMode {
    /// Absolute value of the interpolated normal as color
    Normals,
    /// Recursive Phong with shadows, reflection and refraction
    Phong,
    /// White on hit, black on miss
    Flat,
    /// Diffuse material color without lighting
    Unlit,
}

/// Order in which a pass visits pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    /// Row by row, pixels of a row in parallel
    #[default]
    Rows,
    /// Square tiles in spiral order from the image center
    Buckets,
}

/// User-facing render options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Debug view of interpolated normals (takes precedence over `phong`)
    pub interpolation: bool,
    pub phong: bool,
    /// Material colors without lighting, used when `phong` is off
    pub unlit: bool,
    pub shadows: bool,
    pub reflection: bool,
    pub refraction: bool,
    pub fresnel: bool,
    /// Soft shadows from sampled light positions
    pub monte_carlo: bool,
    pub orthographic: bool,

    /// Full field of view in degrees
    pub fov_degrees: f32,
    /// Recursion budget for reflection and refraction
    pub bounces: u32,
    /// Shadow rays per light when `monte_carlo` is on
    pub light_samples: u32,
    /// Seed for light sampling
    pub seed: u64,

    pub schedule: Schedule,
    pub bucket_size: u32,

    pub model_translation: [f32; 3],
    /// XYZ Euler angles in degrees
    pub model_rotation_degrees: [f32; 3],
    pub camera_position: [f32; 3],
    /// XYZ Euler angles in degrees
    pub camera_rotation_degrees: [f32; 3],
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            interpolation: false,
            phong: true,
            unlit: false,
            shadows: false,
            reflection: false,
            refraction: false,
            fresnel: false,
            monte_carlo: false,
            orthographic: false,
            fov_degrees: 80.0,
            bounces: 10,
            light_samples: 16,
            seed: 0,
            schedule: Schedule::Rows,
            bucket_size: 64,
            model_translation: [0.0, 0.0, 2.0],
            model_rotation_degrees: [0.0; 3],
            camera_position: [0.0; 3],
            camera_rotation_degrees: [0.0; 3],
        }
    }
}

impl RenderOptions {
    /// Parse and validate options from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load and validate options from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Loaded render options from {:?}", path.as_ref());
        Self::from_json_str(&json)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid {
                field: "fov_degrees",
                message: format!("{} is outside (0, 180)", self.fov_degrees),
            });
        }
        if self.light_samples == 0 {
            return Err(ConfigError::Invalid {
                field: "light_samples",
                message: "must be at least 1".to_string(),
            });
        }
        if self.bucket_size == 0 {
            return Err(ConfigError::Invalid {
                field: "bucket_size",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Field of view in radians.
    pub fn fov(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    /// Pick the per-pixel shading mode from the toggles.
    pub fn shading_mode(&self) -> ShadingMode {
        if self.interpolation {
            ShadingMode::Normals
        } else if self.phong {
            ShadingMode::Phong
        } else if self.unlit {
            ShadingMode::Unlit
        } else {
            ShadingMode::Flat
        }
    }

    /// Model placement: translation after rotation.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::from(self.model_translation))
            * Mat4::from_quat(euler_degrees(self.model_rotation_degrees))
    }

    /// World to camera: inverse rotation after inverse translation.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(euler_degrees(self.camera_rotation_degrees).inverse())
            * Mat4::from_translation(-Vec3::from(self.camera_position))
    }
}

fn euler_degrees(angles: [f32; 3]) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        angles[0].to_radians(),
        angles[1].to_radians(),
        angles[2].to_radians(),
    )
}

/// Everything the engine reads while rendering one pass.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub options: RenderOptions,
    pub lights: Vec<Light>,
    model: Mat4,
    view: Mat4,
}

impl RenderSettings {
    /// Create settings with transforms taken from the options.
    pub fn new(options: RenderOptions, lights: Vec<Light>) -> Self {
        let model = options.model_matrix();
        let view = options.view_matrix();
        Self {
            options,
            lights,
            model,
            view,
        }
    }

    /// Override the model transform.
    pub fn with_model_matrix(mut self, model: Mat4) -> Self {
        self.model = model;
        self
    }

    /// Override the view transform.
    pub fn with_view_matrix(mut self, view: Mat4) -> Self {
        self.view = view;
        self
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// Combined view x model transform.
    pub fn modelview(&self) -> Mat4 {
        self.view * self.model
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::new(RenderOptions::default(), Vec::new())
    }
}
