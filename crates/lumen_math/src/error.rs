use thiserror::Error;

/// Errors raised by the math primitives.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("component index {index} out of range for a {len}-component value")]
    IndexOutOfRange { index: usize, len: usize },
}
