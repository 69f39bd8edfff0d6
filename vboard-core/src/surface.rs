/// Colors, stroke segments and the raster surface the core draws on
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const PINK: Color = Color::rgb(255, 0, 255);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Painting in black removes ink: the compositor treats black canvas
    /// pixels as transparent.
    pub const ERASER: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn is_eraser(self) -> bool {
        self == Self::ERASER
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::PINK
    }
}

/// One freehand segment committed to the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeSegment {
    pub from: Point2<i32>,
    pub to: Point2<i32>,
    pub color: Color,
    pub thickness: u32,
}

/// A mutable image the core can draw lines on.
///
/// Implementations own pixel storage and rasterization; the core never reads
/// pixels back.
pub trait RasterSurface {
    fn draw_line(&mut self, from: Point2<i32>, to: Point2<i32>, color: Color, thickness: u32);

    /// Wipe the surface back to its empty state
    fn clear(&mut self);

    fn draw_segment(&mut self, segment: &StrokeSegment) {
        self.draw_line(segment.from, segment.to, segment.color, segment.thickness);
    }
}

/// Surface that keeps the draw calls instead of rasterizing them.
/// Used for headless replays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineRecorder {
    pub lines: Vec<StrokeSegment>,
    pub clears: usize,
}

impl LineRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RasterSurface for LineRecorder {
    fn draw_line(&mut self, from: Point2<i32>, to: Point2<i32>, color: Color, thickness: u32) {
        self.lines.push(StrokeSegment {
            from,
            to,
            color,
            thickness,
        });
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.clears += 1;
    }
}
