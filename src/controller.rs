//! Focus controller
//!
//! Closed-loop contrast autofocus over a 1-D actuator range. Once per frame
//! the pipeline pushes the commanded position into the outgoing capture
//! request (`prepare`), then hands back the statistics collected for an
//! earlier frame (`process`). The controller reduces the statistics grid to a
//! scalar sharpness estimate and drives the scan phase machine, which walks
//! the actuator toward the position of peak variance.
//!
//! Moves take optical effect only after the actuator settles, so a bounded
//! number of frames following every move are discarded before measuring
//! resumes.

use crate::config::ScanTuning;
use crate::errors::AfError;
use crate::grid::GridGeometry;
use crate::scan::{ScanPass, ScanPhase, ScanStep};
use crate::stats;
use crate::types::{ConfigInfo, FocusStatus, FrameParams};

/// Position reported while no valid configuration is active.
const DEFAULT_FOCUS: u32 = 0;

/// Contrast autofocus state machine.
///
/// Inert until the first successful [`configure`](Self::configure); an inert
/// controller holds the default position and reports itself converged so the
/// pipeline never waits on a scan that will not run.
#[derive(Debug)]
pub struct FocusController {
    tuning: ScanTuning,
    state: Option<Active>,
}

/// Mutable scan state, present only after a successful configure.
#[derive(Debug)]
struct Active {
    grid: GridGeometry,
    max_step: u32,
    phase: ScanPhase,
    pass: ScanPass,
    focus: u32,
    best_focus: u32,
    current_variance: f64,
    previous_variance: f64,
    converged_variance: f64,
    ignore_frames: u32,
}

impl FocusController {
    /// Create a controller with default scan tuning.
    pub fn new() -> Self {
        Self {
            tuning: ScanTuning::default(),
            state: None,
        }
    }

    /// Create a controller with explicit scan tuning.
    pub fn with_tuning(tuning: ScanTuning) -> Result<Self, AfError> {
        tuning.validate()?;
        Ok(Self {
            tuning,
            state: None,
        })
    }

    /// Active scan tuning.
    pub fn tuning(&self) -> &ScanTuning {
        &self.tuning
    }

    /// Validate the negotiated configuration and reset the scan state.
    ///
    /// On failure the previous state, configured or not, is left untouched.
    pub fn configure(&mut self, info: &ConfigInfo) -> Result<(), AfError> {
        let grid = GridGeometry::from_config(info)?;
        if info.max_focus_step == 0 {
            return Err(AfError::DegenerateFocusRange);
        }

        log::info!(
            "Configured {}x{} statistics grid ({}x{} px blocks), focus range [0, {}]",
            grid.width,
            grid.height,
            grid.block_width,
            grid.block_height,
            info.max_focus_step
        );

        self.state = Some(Active::new(grid, info.max_focus_step, &self.tuning));
        Ok(())
    }

    /// Write the commanded actuator position into the next capture request.
    pub fn prepare(&self, params: &mut FrameParams) {
        params.focus = match &self.state {
            Some(state) => state.focus,
            None => DEFAULT_FOCUS,
        };
    }

    /// Consume one frame's statistics buffer and advance the scan.
    ///
    /// Buffers inconsistent with the configured grid are discarded like
    /// settling frames; nothing here fails or panics.
    pub fn process(&mut self, raw: &[u8]) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let expected = state.grid.cell_count() * stats::CELL_BYTES;
        if raw.len() != expected {
            log::warn!(
                "Discarding inconsistent statistics buffer: {} bytes, expected {}",
                raw.len(),
                expected
            );
            return;
        }

        if state.ignore_frames > 0 {
            state.ignore_frames -= 1;
            log::debug!("Ignoring settling frame, {} remaining", state.ignore_frames);
            return;
        }

        state.current_variance = stats::estimate_variance(raw, state.phase.channel());

        match state.phase {
            ScanPhase::Idle => {
                log::info!("Starting coarse scan over [0, {}]", state.max_step);
                state.phase = ScanPhase::Coarse;
                state.step_scan(&self.tuning);
            }
            ScanPhase::Coarse | ScanPhase::Fine => state.step_scan(&self.tuning),
            ScanPhase::Converged => state.watch_scene(&self.tuning),
        }

        state.previous_variance = state.current_variance;
    }

    /// Published focus state, polled by the pipeline after each frame.
    pub fn status(&self) -> FocusStatus {
        match &self.state {
            Some(state) => FocusStatus {
                focus: state.focus,
                phase: state.phase,
                converged: state.phase == ScanPhase::Converged,
                variance: state.current_variance,
            },
            None => FocusStatus {
                focus: DEFAULT_FOCUS,
                phase: ScanPhase::Converged,
                converged: true,
                variance: 0.0,
            },
        }
    }
}

impl Default for FocusController {
    fn default() -> Self {
        Self::new()
    }
}

impl Active {
    fn new(grid: GridGeometry, max_step: u32, tuning: &ScanTuning) -> Self {
        Self {
            grid,
            max_step,
            phase: ScanPhase::Idle,
            pass: ScanPass::new(0, max_step, tuning.coarse_step),
            focus: 0,
            best_focus: 0,
            current_variance: 0.0,
            previous_variance: 0.0,
            converged_variance: 0.0,
            ignore_frames: tuning.settle_frames,
        }
    }

    /// Return to Idle and re-arm the settle delay for a fresh coarse scan.
    fn reset(&mut self, tuning: &ScanTuning) {
        self.phase = ScanPhase::Idle;
        self.pass = ScanPass::new(0, self.max_step, tuning.coarse_step);
        self.focus = 0;
        self.best_focus = 0;
        self.current_variance = 0.0;
        self.previous_variance = 0.0;
        self.converged_variance = 0.0;
        self.ignore_frames = tuning.settle_frames;
    }

    /// One hill-climb step of the active pass, coarse or fine.
    fn step_scan(&mut self, tuning: &ScanTuning) {
        match self
            .pass
            .advance(self.focus, self.current_variance, tuning.decline_ratio)
        {
            ScanStep::Continue(next) => {
                log::debug!(
                    "Scan step {} -> {}, variance {:.1} (previous {:.1})",
                    self.focus,
                    next,
                    self.current_variance,
                    self.previous_variance
                );
                self.focus = next;
            }
            ScanStep::Complete { best, max_variance } => {
                self.best_focus = best;
                self.focus = best;

                if self.phase == ScanPhase::Coarse {
                    let start = (best as f64 * (1.0 - tuning.fine_range)) as u32;
                    let end = ((best as f64 * (1.0 + tuning.fine_range)).ceil() as u32)
                        .min(self.max_step);
                    log::info!(
                        "Coarse scan complete: best step {} (variance {:.1}), refining over [{}, {}]",
                        best,
                        max_variance,
                        start,
                        end
                    );
                    self.pass = ScanPass::new(start, end, tuning.fine_step);
                    self.focus = start;
                    self.phase = ScanPhase::Fine;
                    self.ignore_frames = tuning.settle_frames;
                } else {
                    log::info!(
                        "Fine scan complete: converged at step {} (variance {:.1})",
                        best,
                        max_variance
                    );
                    self.converged_variance = max_variance;
                    self.phase = ScanPhase::Converged;
                    self.ignore_frames = tuning.settle_frames;
                }
            }
        }
    }

    /// Converged-state watchdog: restart the scan when the scene changes.
    fn watch_scene(&mut self, tuning: &ScanTuning) {
        let reference = self.converged_variance;
        let out_of_focus = if reference > 0.0 {
            (self.current_variance - reference).abs() / reference > tuning.refocus_ratio
        } else {
            // Converged on a featureless scene: any contrast at all is new.
            self.current_variance > 0.0
        };

        if out_of_focus {
            log::info!(
                "Scene change at step {}: variance {:.1} vs converged {:.1}, restarting coarse scan",
                self.focus,
                self.current_variance,
                reference
            );
            self.reset(tuning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_info() -> ConfigInfo {
        ConfigInfo {
            window_width: 64,
            window_height: 48,
            block_width: 4,
            block_height: 3,
            max_focus_step: 100,
        }
    }

    #[test]
    fn test_unconfigured_controller_is_inert() {
        let mut af = FocusController::new();

        let mut params = FrameParams { focus: 77 };
        af.prepare(&mut params);
        assert_eq!(params.focus, 0);

        // Any buffer is silently discarded
        af.process(&[0u8; 64]);
        let status = af.status();
        assert!(status.converged);
        assert_eq!(status.focus, 0);
    }

    #[test]
    fn test_configure_resets_scan_state() {
        let mut af = FocusController::new();
        af.configure(&valid_info()).unwrap();

        let status = af.status();
        assert_eq!(status.focus, 0);
        assert_eq!(status.phase, ScanPhase::Idle);
        assert!(!status.converged);
        assert_eq!(status.variance, 0.0);
    }

    #[test]
    fn test_failed_configure_leaves_state_untouched() {
        let mut af = FocusController::new();
        af.configure(&valid_info()).unwrap();

        let bad = ConfigInfo {
            block_width: 9,
            ..valid_info()
        };
        assert!(af.configure(&bad).is_err());

        // Still operating on the previous valid configuration
        let status = af.status();
        assert_eq!(status.phase, ScanPhase::Idle);

        let degenerate = ConfigInfo {
            max_focus_step: 0,
            ..valid_info()
        };
        assert!(matches!(
            af.configure(&degenerate),
            Err(AfError::DegenerateFocusRange)
        ));
        assert_eq!(af.status().phase, ScanPhase::Idle);
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let tuning = ScanTuning {
            fine_step: 0,
            ..Default::default()
        };
        assert!(FocusController::with_tuning(tuning).is_err());
    }

    #[test]
    fn test_wrong_size_buffer_discarded() {
        let mut af = FocusController::new();
        af.configure(&valid_info()).unwrap();

        // 16x16 grid needs 1024 bytes; anything else is an anomaly
        af.process(&[0u8; 100]);
        af.process(&[0u8; 1025]);

        let status = af.status();
        assert_eq!(status.phase, ScanPhase::Idle);
        assert_eq!(status.variance, 0.0);
    }
}
