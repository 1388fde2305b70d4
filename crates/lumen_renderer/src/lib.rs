//! Lumen Renderer - CPU Whitted-style raytracing
//!
//! Casts one ray per pixel into a flat view-space triangle soup and shades
//! hits recursively: Phong direct lighting, hard or sampled shadows, mirror
//! reflection and Fresnel-weighted refraction. Passes run on a background
//! thread and can be cancelled between rows.

mod bucket;
mod camera;
mod color;
mod error;
mod framebuffer;
mod raytracer;
mod renderer;
mod scene;
mod tracer;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::Camera;
pub use color::{color_to_rgba, linear_to_srgb, srgb_to_linear};
pub use error::{RenderError, RenderResult};
pub use framebuffer::FrameBuffer;
pub use raytracer::Raytracer;
pub use renderer::{render_pass, PassOutcome};
pub use scene::{CollisionInfo, Scene, HIT_THRESHOLD, NO_HIT};
pub use tracer::{reflect_ray, refract_ray, schlick, Tracer};
pub use triangle::Triangle;

/// Re-export the types callers need to drive a render
pub use lumen_core::{Color, Light, Material, Model, RenderOptions, RenderSettings};
pub use lumen_math::{Ray, RayKind, Vec3};
