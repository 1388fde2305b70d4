//! Background render passes.
//!
//! `Raytracer` owns the frame buffer and the current scene. Each call to
//! [`Raytracer::render`] stops the running pass, rebuilds the scene from
//! the given models and starts a new pass on a worker thread. Callers read
//! the frame buffer at any time.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use lumen_core::{Model, RenderSettings};

use crate::error::{RenderError, RenderResult};
use crate::framebuffer::{FrameBuffer, CLEAR_COLOR};
use crate::renderer::{render_pass, PassOutcome};
use crate::scene::Scene;

/// Drives render passes for a fixed-size viewport.
pub struct Raytracer {
    scene: Arc<Scene>,
    frame: Arc<FrameBuffer>,
    cancel: Arc<AtomicBool>,
    progress: Arc<AtomicU32>,
    worker: Option<JoinHandle<PassOutcome>>,
    passes: u64,
}

impl Raytracer {
    /// Create a raytracer with a black width x height frame buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            scene: Arc::new(Scene::new()),
            frame: Arc::new(FrameBuffer::new(width, height)),
            cancel: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(AtomicU32::new(0)),
            worker: None,
            passes: 0,
        }
    }

    /// Shared handle to the frame buffer.
    pub fn frame_buffer(&self) -> Arc<FrameBuffer> {
        Arc::clone(&self.frame)
    }

    /// The scene of the latest pass.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Rows or buckets finished by the current pass.
    pub fn progress(&self) -> u32 {
        self.progress.load(Ordering::Relaxed)
    }

    /// Whether a pass is still running.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Start a new pass, cancelling and joining any running one first.
    ///
    /// The scene is rebuilt from `models` with the settings' modelview and
    /// the frame buffer is cleared before the worker starts.
    pub fn render(&mut self, models: &[Model], settings: &RenderSettings) -> RenderResult<()> {
        let (width, height) = (self.frame.width(), self.frame.height());
        if self.frame.is_empty() {
            return Err(RenderError::EmptyViewport { width, height });
        }

        self.stop()?;

        // The worker has been joined, so this is the only reference
        Arc::make_mut(&mut self.scene).update(models, settings.modelview());
        self.frame.clear(CLEAR_COLOR);
        self.cancel.store(false, Ordering::Release);
        self.progress.store(0, Ordering::Relaxed);
        self.passes += 1;

        let scene = Arc::clone(&self.scene);
        let settings = settings.clone();
        let frame = Arc::clone(&self.frame);
        let cancel = Arc::clone(&self.cancel);
        let progress = Arc::clone(&self.progress);
        let pass = self.passes;

        log::info!(
            "Starting pass {}: {}x{}, {} triangles, {} lights",
            pass,
            width,
            height,
            scene.len(),
            settings.lights.len()
        );

        let worker = thread::Builder::new()
            .name(format!("lumen-pass-{}", pass))
            .spawn(move || {
                let start = Instant::now();
                let outcome = render_pass(&scene, &settings, &frame, &cancel, &progress);
                match outcome {
                    PassOutcome::Completed => {
                        log::info!("Pass {} completed in {:.2?}", pass, start.elapsed())
                    }
                    PassOutcome::Cancelled { units } => {
                        log::info!("Pass {} cancelled after {} units", pass, units)
                    }
                }
                outcome
            })?;

        self.worker = Some(worker);
        Ok(())
    }

    /// Cancel the running pass and wait for it.
    ///
    /// Returns `None` when no pass was started since the last stop or wait.
    pub fn stop(&mut self) -> RenderResult<Option<PassOutcome>> {
        if self.worker.is_none() {
            return Ok(None);
        }
        self.cancel.store(true, Ordering::Release);
        self.join()
    }

    /// Wait for the running pass to finish on its own.
    pub fn wait(&mut self) -> RenderResult<Option<PassOutcome>> {
        self.join()
    }

    fn join(&mut self) -> RenderResult<Option<PassOutcome>> {
        let Some(worker) = self.worker.take() else {
            return Ok(None);
        };
        let outcome = worker.join().map_err(|_| RenderError::WorkerPanicked)?;
        self.cancel.store(false, Ordering::Release);
        Ok(Some(outcome))
    }

    /// Stop any pass and replace the frame buffer with a new size.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.stop()?;
        self.frame = Arc::new(FrameBuffer::new(width, height));
        log::debug!("Viewport resized to {}x{}", width, height);
        Ok(())
    }
}

impl Drop for Raytracer {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Render thread did not shut down cleanly: {}", e);
        }
    }
}
