//! Interpolation helpers.
//!
//! Transitions are linear in time; the helpers here cover scalars, RGBA colors and
//! the time → progress mapping shared by every transition.

pub mod functions;

pub use functions::{lerp_f32, lerp_rgba, progress};
