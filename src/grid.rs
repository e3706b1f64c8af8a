//! Statistics grid geometry
//!
//! The sensor's signal processor reduces each captured frame to a grid of
//! contrast averages. The grid dimensions are negotiated once per stream
//! configuration and bounded by what the hardware supports; anything outside
//! the supported range is rejected up front so frame processing never has to
//! re-validate geometry.

use serde::{Deserialize, Serialize};

use crate::errors::AfError;
use crate::types::ConfigInfo;

/// Hardware limits for the contrast statistics grid.
pub const MIN_GRID_WIDTH: u32 = 16;
pub const MAX_GRID_WIDTH: u32 = 32;
pub const MIN_GRID_HEIGHT: u32 = 16;
pub const MAX_GRID_HEIGHT: u32 = 24;
pub const MIN_BLOCK_WIDTH: u32 = 4;
pub const MAX_BLOCK_WIDTH: u32 = 6;
pub const MIN_BLOCK_HEIGHT: u32 = 3;
pub const MAX_BLOCK_HEIGHT: u32 = 6;

/// Validated statistics grid geometry, fixed for the life of a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Grid width in blocks.
    pub width: u32,
    /// Grid height in blocks.
    pub height: u32,
    /// Block width in pixels.
    pub block_width: u32,
    /// Block height in pixels.
    pub block_height: u32,
}

impl GridGeometry {
    /// Derive and validate the grid geometry from a negotiated configuration.
    ///
    /// The measurement window must divide evenly into blocks and the
    /// resulting block counts must be within the hardware-supported range.
    pub fn from_config(info: &ConfigInfo) -> Result<Self, AfError> {
        if !(MIN_BLOCK_WIDTH..=MAX_BLOCK_WIDTH).contains(&info.block_width)
            || !(MIN_BLOCK_HEIGHT..=MAX_BLOCK_HEIGHT).contains(&info.block_height)
        {
            return Err(AfError::InvalidBlockSize {
                width: info.block_width,
                height: info.block_height,
            });
        }

        if info.window_width % info.block_width != 0
            || info.window_height % info.block_height != 0
        {
            return Err(AfError::UnevenWindow {
                window: (info.window_width, info.window_height),
                block: (info.block_width, info.block_height),
            });
        }

        let width = info.window_width / info.block_width;
        let height = info.window_height / info.block_height;

        if !(MIN_GRID_WIDTH..=MAX_GRID_WIDTH).contains(&width)
            || !(MIN_GRID_HEIGHT..=MAX_GRID_HEIGHT).contains(&height)
        {
            return Err(AfError::InvalidGridSize { width, height });
        }

        Ok(Self {
            width,
            height,
            block_width: info.block_width,
            block_height: info.block_height,
        })
    }

    /// Number of cells in one frame's statistics buffer.
    pub fn cell_count(&self) -> usize {
        (self.width * self.height) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(ww: u32, wh: u32, bw: u32, bh: u32) -> ConfigInfo {
        ConfigInfo {
            window_width: ww,
            window_height: wh,
            block_width: bw,
            block_height: bh,
            max_focus_step: 1023,
        }
    }

    #[test]
    fn test_valid_geometry() {
        // 16x16 blocks of 4x3 px
        let grid = GridGeometry::from_config(&info(64, 48, 4, 3)).unwrap();
        assert_eq!(grid.width, 16);
        assert_eq!(grid.height, 16);
        assert_eq!(grid.cell_count(), 256);

        // Largest supported grid: 32x24 blocks of 6x6 px
        let grid = GridGeometry::from_config(&info(192, 144, 6, 6)).unwrap();
        assert_eq!(grid.width, 32);
        assert_eq!(grid.height, 24);
        assert_eq!(grid.cell_count(), 768);
    }

    #[test]
    fn test_block_size_out_of_bounds() {
        assert!(matches!(
            GridGeometry::from_config(&info(64, 48, 3, 3)),
            Err(AfError::InvalidBlockSize { .. })
        ));
        assert!(matches!(
            GridGeometry::from_config(&info(64, 48, 4, 7)),
            Err(AfError::InvalidBlockSize { .. })
        ));
    }

    #[test]
    fn test_window_must_divide_evenly() {
        assert!(matches!(
            GridGeometry::from_config(&info(65, 48, 4, 3)),
            Err(AfError::UnevenWindow { .. })
        ));
        assert!(matches!(
            GridGeometry::from_config(&info(64, 50, 4, 3)),
            Err(AfError::UnevenWindow { .. })
        ));
    }

    #[test]
    fn test_grid_count_out_of_bounds() {
        // 8x16 blocks: narrower than the hardware minimum
        assert!(matches!(
            GridGeometry::from_config(&info(32, 48, 4, 3)),
            Err(AfError::InvalidGridSize { width: 8, .. })
        ));
        // 40x16 blocks: wider than the hardware maximum
        assert!(matches!(
            GridGeometry::from_config(&info(160, 48, 4, 3)),
            Err(AfError::InvalidGridSize { width: 40, .. })
        ));
        // 16x30 blocks: taller than the hardware maximum
        assert!(matches!(
            GridGeometry::from_config(&info(64, 90, 4, 3)),
            Err(AfError::InvalidGridSize { height: 30, .. })
        ));
    }
}
