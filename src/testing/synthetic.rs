//! Synthetic statistics buffers
//!
//! Builds wire-format statistics frames with known spatial variance so the
//! scan logic can be exercised offline. The texture model is a checkerboard:
//! alternating cells at `base + amplitude` and `base - amplitude`, which has
//! a variance of exactly `amplitude^2` on an even cell count.
//!
//! [`FocusCurve`] models a defocused lens: texture amplitude peaks at one
//! actuator position and falls off linearly with distance, giving a unimodal
//! variance response over the scan range.

use crate::grid::GridGeometry;
use crate::stats::CellAverages;

/// Serialize cells into the hardware wire format.
pub fn encode_cells(cells: &[CellAverages]) -> Vec<u8> {
    let mut raw = Vec::with_capacity(cells.len() * crate::stats::CELL_BYTES);
    for cell in cells {
        raw.extend_from_slice(&cell.to_bytes());
    }
    raw
}

/// A featureless frame: every cell at the same level, zero variance.
pub fn flat_frame(grid: &GridGeometry, level: u16) -> Vec<u8> {
    let cell = CellAverages {
        coarse: level,
        fine: level,
    };
    encode_cells(&vec![cell; grid.cell_count()])
}

/// A checkerboard frame whose variance is `amplitude^2` on both channels.
pub fn textured_frame(grid: &GridGeometry, base: u16, amplitude: u16) -> Vec<u8> {
    let cells: Vec<CellAverages> = (0..grid.cell_count())
        .map(|i| {
            let level = if i % 2 == 0 {
                base.saturating_add(amplitude)
            } else {
                base.saturating_sub(amplitude)
            };
            CellAverages {
                coarse: level,
                fine: level,
            }
        })
        .collect();
    encode_cells(&cells)
}

/// Unimodal lens defocus model over the actuator range.
#[derive(Debug, Clone, Copy)]
pub struct FocusCurve {
    /// Actuator position of best focus.
    pub peak: u32,
    /// Distance in steps over which texture amplitude falls to zero.
    pub falloff: u32,
    /// Texture amplitude at the peak.
    pub max_amplitude: u16,
}

impl FocusCurve {
    pub fn new(peak: u32, falloff: u32, max_amplitude: u16) -> Self {
        Self {
            peak,
            falloff,
            max_amplitude,
        }
    }

    /// Texture amplitude seen at `step`, falling off linearly from the peak.
    pub fn amplitude_at(&self, step: u32) -> u16 {
        let distance = step.abs_diff(self.peak);
        if distance >= self.falloff {
            return 0;
        }
        let scale = 1.0 - distance as f64 / self.falloff as f64;
        (self.max_amplitude as f64 * scale) as u16
    }

    /// Build the statistics frame the sensor would produce at `step`.
    pub fn frame_at(&self, grid: &GridGeometry, step: u32) -> Vec<u8> {
        textured_frame(grid, 512, self.amplitude_at(step))
    }
}
