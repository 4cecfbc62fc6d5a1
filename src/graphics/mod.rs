//! Turtle graphics state machine
//!
//! Tracks position, heading, pen and colours. The turtle never draws: each
//! command that should leave a mark returns a `DrawCommand` for the host's
//! renderer. Coordinates are centred on the canvas with y growing downward,
//! so headings increase clockwise on screen (0 = east, 90 = south).

pub mod canvas;

pub use canvas::Canvas;

use crate::config::InterpreterConfig;
use crate::error::{BasicError, Result};

/// A point in turtle coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };
}

/// Drawing primitive emitted for the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Straight segment drawn by a movement with the pen down
    Line {
        from: Point,
        to: Point,
        color: u8,
        thickness: u32,
    },
    /// Circle outline
    Circle {
        center: Point,
        radius: f64,
        color: u8,
        thickness: u32,
    },
    /// Repaint the whole canvas
    Clear { color: u8 },
}

/// Number of palette entries
pub const PALETTE_SIZE: usize = 16;

/// The fixed palette, in C64 order
const PALETTE: [(&str, (u8, u8, u8)); PALETTE_SIZE] = [
    ("BLACK", (0, 0, 0)),
    ("WHITE", (255, 255, 255)),
    ("RED", (136, 0, 0)),
    ("CYAN", (170, 255, 238)),
    ("PURPLE", (204, 68, 204)),
    ("GREEN", (0, 204, 85)),
    ("BLUE", (0, 0, 170)),
    ("YELLOW", (238, 238, 119)),
    ("ORANGE", (221, 136, 85)),
    ("BROWN", (102, 68, 0)),
    ("PINK", (255, 119, 119)),
    ("DARKGREY", (51, 51, 51)),
    ("GREY", (119, 119, 119)),
    ("LIGHTGREEN", (170, 255, 102)),
    ("LIGHTBLUE", (0, 136, 255)),
    ("LIGHTGREY", (187, 187, 187)),
];

/// Alternative spellings accepted by PEN and BG
const ALIASES: &[(&str, u8)] = &[
    ("MAGENTA", 4),
    ("LIGHTRED", 10),
    ("DARKGRAY", 11),
    ("GRAY", 12),
    ("LIGHTGRAY", 15),
];

/// Look up a colour name, case-insensitively
pub fn color_by_name(name: &str) -> Option<u8> {
    let upper = name.to_ascii_uppercase();
    PALETTE
        .iter()
        .position(|(entry, _)| *entry == upper)
        .map(|index| index as u8)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| *alias == upper)
                .map(|(_, index)| *index)
        })
}

/// Validate a numeric colour index
pub fn color_by_index(value: f64) -> Result<u8> {
    if value.fract() != 0.0 || !(0.0..PALETTE_SIZE as f64).contains(&value) {
        return Err(BasicError::value(format!(
            "color index {} out of range 0-15",
            value
        )));
    }
    Ok(value as u8)
}

/// Palette name of an index
pub fn color_name(index: u8) -> &'static str {
    PALETTE[usize::from(index) % PALETTE_SIZE].0
}

/// RGB triple of an index, for renderers
pub fn color_rgb(index: u8) -> (u8, u8, u8) {
    PALETTE[usize::from(index) % PALETTE_SIZE].1
}

/// Normalise an angle into [0, 360)
pub fn normalize_heading(degrees: f64) -> f64 {
    let heading = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if heading >= 360.0 {
        0.0
    } else {
        heading
    }
}

/// Unit vector for a heading; axis headings are exact
fn direction(heading: f64) -> (f64, f64) {
    if heading == 0.0 {
        (1.0, 0.0)
    } else if heading == 90.0 {
        (0.0, 1.0)
    } else if heading == 180.0 {
        (-1.0, 0.0)
    } else if heading == 270.0 {
        (0.0, -1.0)
    } else {
        let (sin, cos) = heading.to_radians().sin_cos();
        (cos, sin)
    }
}

/// Mutable drawing state
#[derive(Debug, Clone, PartialEq)]
pub struct Turtle {
    position: Point,
    /// Degrees in [0, 360), clockwise from east
    heading: f64,
    pen_down: bool,
    pen_color: u8,
    background: u8,
    thickness: u32,
}

impl Turtle {
    /// Create a turtle at the origin, facing east, pen down
    pub fn new(config: &InterpreterConfig) -> Self {
        Self {
            position: Point::ORIGIN,
            heading: 0.0,
            pen_down: true,
            pen_color: config.pen_color % PALETTE_SIZE as u8,
            background: config.background % PALETTE_SIZE as u8,
            thickness: config.thickness.max(1),
        }
    }

    /// Return to the initial state
    pub fn reset(&mut self, config: &InterpreterConfig) {
        *self = Self::new(config);
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn is_pen_down(&self) -> bool {
        self.pen_down
    }

    pub fn pen_color(&self) -> u8 {
        self.pen_color
    }

    pub fn background(&self) -> u8 {
        self.background
    }

    pub fn thickness(&self) -> u32 {
        self.thickness
    }

    /// FD: move along the heading, emitting a segment if the pen is down
    pub fn forward(&mut self, distance: f64) -> Option<DrawCommand> {
        let (dx, dy) = direction(self.heading);
        let target = Point::new(
            self.position.x + dx * distance,
            self.position.y + dy * distance,
        );
        self.move_to(target)
    }

    /// BK: move against the heading
    pub fn back(&mut self, distance: f64) -> Option<DrawCommand> {
        self.forward(-distance)
    }

    /// RT: turn clockwise
    pub fn right(&mut self, degrees: f64) {
        self.heading = normalize_heading(self.heading + degrees);
    }

    /// LT: turn anticlockwise
    pub fn left(&mut self, degrees: f64) {
        self.heading = normalize_heading(self.heading - degrees);
    }

    /// GO: jump to an absolute position, emitting a segment if the pen is down
    pub fn go_to(&mut self, x: f64, y: f64) -> Option<DrawCommand> {
        self.move_to(Point::new(x, y))
    }

    fn move_to(&mut self, target: Point) -> Option<DrawCommand> {
        let from = self.position;
        self.position = target;
        self.pen_down.then(|| DrawCommand::Line {
            from,
            to: target,
            color: self.pen_color,
            thickness: self.thickness,
        })
    }

    pub fn pen_up(&mut self) {
        self.pen_down = false;
    }

    pub fn pen_down(&mut self) {
        self.pen_down = true;
    }

    pub fn set_pen_color(&mut self, index: u8) {
        self.pen_color = index;
    }

    /// BG: change the background and repaint the canvas
    pub fn set_background(&mut self, index: u8) -> DrawCommand {
        self.background = index;
        DrawCommand::Clear { color: index }
    }

    /// THICK: positive integral width
    pub fn set_thickness(&mut self, width: f64) -> Result<()> {
        if width.fract() != 0.0 || width < 1.0 || width > f64::from(u32::MAX) {
            return Err(BasicError::value(format!(
                "thickness {} must be a positive integer",
                width
            )));
        }
        self.thickness = width as u32;
        Ok(())
    }

    /// CIRCLE: circle through the turtle, tangent to its heading
    ///
    /// The centre sits `radius` units to the turtle's right. The turtle does
    /// not move.
    pub fn circle(&self, radius: f64) -> Result<DrawCommand> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(BasicError::value(format!(
                "circle radius {} must be positive",
                radius
            )));
        }
        let (dx, dy) = direction(normalize_heading(self.heading + 90.0));
        Ok(DrawCommand::Circle {
            center: Point::new(
                self.position.x + dx * radius,
                self.position.y + dy * radius,
            ),
            radius,
            color: self.pen_color,
            thickness: self.thickness,
        })
    }
}

impl Default for Turtle {
    fn default() -> Self {
        Self::new(&InterpreterConfig::default())
    }
}
