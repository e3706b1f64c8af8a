//! CrabFocus: contrast-based autofocus control for camera pipelines
//!
//! This crate implements the autofocus stage of an image-processing
//! pipeline: a closed-loop search that drives a VCM focus actuator toward
//! the position maximizing scene sharpness, using the per-frame contrast
//! statistics grid produced by the sensor's signal processor.
//!
//! # Features
//! - Two-phase search: coarse hill-climb over the full range, fine
//!   refinement around the optimum
//! - Settling-delay compensation for actuator latency
//! - Out-of-focus detection and automatic rescan on scene changes
//! - Bit-exact parsing of the hardware statistics layout
//! - Synthetic statistics generation for offline testing
//!
//! # Usage
//! ```rust
//! use crabfocus::{ConfigInfo, FocusController, FrameParams};
//!
//! let mut af = FocusController::new();
//! af.configure(&ConfigInfo {
//!     window_width: 64,
//!     window_height: 48,
//!     block_width: 4,
//!     block_height: 3,
//!     max_focus_step: 1023,
//! })
//! .expect("geometry within hardware bounds");
//!
//! // Once per frame:
//! let mut params = FrameParams::default();
//! af.prepare(&mut params);
//! // ... capture with params, then hand the statistics back:
//! let stats = vec![0u8; 256 * 4];
//! af.process(&stats);
//! let status = af.status();
//! assert!(!status.converged);
//! ```

pub mod config;
pub mod controller;
pub mod errors;
pub mod grid;
pub mod scan;
pub mod stats;
pub mod types;

// Testing utilities - synthetic statistics for offline testing
pub mod testing;

// Re-exports for convenience
pub use config::ScanTuning;
pub use controller::FocusController;
pub use errors::AfError;
pub use grid::GridGeometry;
pub use scan::ScanPhase;
pub use stats::{CellAverages, SharpnessChannel};
pub use types::{ConfigInfo, FocusStatus, FrameParams};

/// Initialize logging for the autofocus controller
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "crabfocus=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
