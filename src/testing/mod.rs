//! Testing utilities for CrabFocus
//!
//! Provides synthetic statistics buffers and a lens defocus model for
//! offline testing without sensor hardware.

pub mod synthetic;

pub use synthetic::{encode_cells, flat_frame, textured_frame, FocusCurve};
