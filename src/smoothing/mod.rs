//! Post-process smoothing filters.

mod filters;
mod kernel;

pub use filters::{box_average, gaussian_blur, separable_blur, smooth, SmoothingKind};
pub use kernel::{FilterKernel, GAUSSIAN_7};
