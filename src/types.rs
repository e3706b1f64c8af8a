//! Pipeline-facing data types
//!
//! Records exchanged with the owning image pipeline: the negotiated
//! configuration handed to [`FocusController::configure`], the per-frame
//! request filled in by [`FocusController::prepare`], and the published
//! focus state polled after [`FocusController::process`].
//!
//! [`FocusController::configure`]: crate::controller::FocusController::configure
//! [`FocusController::prepare`]: crate::controller::FocusController::prepare
//! [`FocusController::process`]: crate::controller::FocusController::process

use serde::{Deserialize, Serialize};

use crate::scan::ScanPhase;

/// Negotiated sensor configuration read once at configure time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigInfo {
    /// Measurement window width in pixels.
    pub window_width: u32,
    /// Measurement window height in pixels.
    pub window_height: u32,
    /// Statistics block width in pixels.
    pub block_width: u32,
    /// Statistics block height in pixels.
    pub block_height: u32,
    /// Upper bound of the focus actuator range, in steps.
    pub max_focus_step: u32,
}

/// Per-frame capture request sent to the statistics hardware.
///
/// The pipeline owns the request; autofocus only fills in the actuator
/// target so the eventual statistics correspond to a known position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameParams {
    /// Target actuator position for the next capture.
    pub focus: u32,
}

/// Published focus state, polled by the pipeline after each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FocusStatus {
    /// Currently commanded actuator position.
    pub focus: u32,
    /// Active scan phase.
    pub phase: ScanPhase,
    /// True once the fine scan has settled on an optimum.
    pub converged: bool,
    /// Most recent sharpness estimate (spatial variance of cell averages).
    pub variance: f64,
}
