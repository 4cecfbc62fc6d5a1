//! Interpreter configuration
//!
//! Initial turtle state, run limits and where saved programs live.

use std::path::PathBuf;

/// Default canvas width (graphics pane beside the console)
const DEFAULT_WIDTH: u32 = 640;
/// Default canvas height
const DEFAULT_HEIGHT: u32 = 720;

/// Settings applied when an interpreter is created and on every RUN
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterConfig {
    /// Canvas width reported to hosts (turtle coordinates are centre-origin)
    pub canvas_width: u32,
    /// Canvas height reported to hosts
    pub canvas_height: u32,
    /// Palette index of the initial pen colour
    pub pen_color: u8,
    /// Palette index of the initial background
    pub background: u8,
    /// Initial line thickness
    pub thickness: u32,
    /// Statement budget for `run_to_end`; None runs until the program halts
    pub max_steps: Option<u64>,
    /// Directory holding `<NAME>.bas` files for SAVE, LOAD and DIR
    pub program_dir: PathBuf,
}

impl InterpreterConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            canvas_width: DEFAULT_WIDTH,
            canvas_height: DEFAULT_HEIGHT,
            pen_color: 1,  // White
            background: 6, // Blue
            thickness: 2,
            max_steps: None,
            program_dir: PathBuf::from("."),
        }
    }

    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    pub fn with_pen_color(mut self, index: u8) -> Self {
        self.pen_color = index;
        self
    }

    pub fn with_background(mut self, index: u8) -> Self {
        self.background = index;
        self
    }

    pub fn with_thickness(mut self, thickness: u32) -> Self {
        self.thickness = thickness.max(1);
        self
    }

    pub fn with_max_steps(mut self, max_steps: Option<u64>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_program_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.program_dir = dir.into();
        self
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self::new()
    }
}
