use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AfError {
    InvalidBlockSize { width: u32, height: u32 },
    UnevenWindow { window: (u32, u32), block: (u32, u32) },
    InvalidGridSize { width: u32, height: u32 },
    DegenerateFocusRange,
    InvalidTuning(String),
    ConfigIo(String),
}

impl fmt::Display for AfError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AfError::InvalidBlockSize { width, height } => {
                write!(f, "Unsupported statistics block size: {}x{} px", width, height)
            }
            AfError::UnevenWindow { window, block } => write!(
                f,
                "Measurement window {}x{} px is not divisible by {}x{} px blocks",
                window.0, window.1, block.0, block.1
            ),
            AfError::InvalidGridSize { width, height } => {
                write!(f, "Unsupported statistics grid size: {}x{} blocks", width, height)
            }
            AfError::DegenerateFocusRange => {
                write!(f, "Focus actuator range is degenerate (max step is 0)")
            }
            AfError::InvalidTuning(msg) => write!(f, "Invalid scan tuning: {}", msg),
            AfError::ConfigIo(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AfError {}
