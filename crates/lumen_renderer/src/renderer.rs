//! One render pass over the frame buffer.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use lumen_core::{RenderSettings, Schedule};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket};
use crate::camera::Camera;
use crate::color::color_to_rgba;
use crate::framebuffer::FrameBuffer;
use crate::scene::Scene;
use crate::tracer::Tracer;

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every pixel was written
    Completed,
    /// Stopped early; `units` rows or buckets were finished
    Cancelled { units: u32 },
}

/// Deterministic per-pixel random source.
pub(crate) fn pixel_rng(seed: u64, x: u32, y: u32, width: u32) -> StdRng {
    let index = y as u64 * width as u64 + x as u64;
    StdRng::seed_from_u64(seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Render `scene` into `frame`.
///
/// Rows are visited bottom to top with the pixels of a row shaded in
/// parallel; with [`Schedule::Buckets`] tiles are shaded in parallel in
/// spiral order. `cancel` is polled after every row or bucket, and
/// `progress` counts finished rows or buckets.
pub fn render_pass(
    scene: &Scene,
    settings: &RenderSettings,
    frame: &FrameBuffer,
    cancel: &AtomicBool,
    progress: &AtomicU32,
) -> PassOutcome {
    let options = &settings.options;
    let (width, height) = (frame.width(), frame.height());
    let camera = Camera::new(width, height, options.fov()).with_orthographic(options.orthographic);
    let tracer = Tracer::new(scene, settings);
    let mode = options.shading_mode();

    log::debug!(
        "Pass: {}x{}, {} triangles, {:?} shading, {:?} schedule",
        width,
        height,
        scene.len(),
        mode,
        options.schedule
    );

    let outcome = match options.schedule {
        Schedule::Rows => {
            let mut outcome = PassOutcome::Completed;
            for y in 0..height {
                (0..width).into_par_iter().for_each(|x| {
                    let mut rng = pixel_rng(options.seed, x, y, width);
                    let color = tracer.shade_pixel(mode, &camera.ray(x, y), &mut rng);
                    frame.set(x, y, color_to_rgba(color));
                });
                let done = progress.fetch_add(1, Ordering::Relaxed) + 1;
                if cancel.load(Ordering::Acquire) {
                    outcome = PassOutcome::Cancelled { units: done };
                    break;
                }
            }
            outcome
        }
        Schedule::Buckets => {
            let buckets = generate_buckets(width, height, options.bucket_size);
            buckets.par_iter().for_each(|bucket| {
                if cancel.load(Ordering::Acquire) {
                    return;
                }
                let result = render_bucket(bucket, &camera, &tracer, mode, options.seed, width);
                frame.write_bucket(&result);
                progress.fetch_add(1, Ordering::Relaxed);
            });

            let done = progress.load(Ordering::Relaxed);
            if done as usize == buckets.len() {
                PassOutcome::Completed
            } else {
                PassOutcome::Cancelled { units: done }
            }
        }
    };

    log::debug!("Pass finished: {:?}", outcome);
    outcome
}
