//! Render errors.

use thiserror::Error;

/// Errors that can occur while starting or finishing a render pass.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Viewport is empty ({width}x{height})")]
    EmptyViewport { width: u32, height: u32 },

    #[error("Failed to spawn render thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Render thread panicked")]
    WorkerPanicked,
}

pub type RenderResult<T> = Result<T, RenderError>;
