/// Character-cell rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Point2;
use std::io::Write;
use vboard_core::{Color, RasterSurface};

/// One occupied terminal cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub color: Color,
}

/// A grid of terminal cells addressed in image pixel coordinates.
///
/// Lines and text are given in the pixel space of the camera frame and
/// scaled down to cells, so the core never needs to know the terminal size.
pub struct CellCanvas {
    width: usize,
    height: usize,
    frame_width: f64,
    frame_height: f64,
    cells: Vec<Option<Cell>>,
    /// Glyph used by subsequent `draw_line` calls
    pub glyph: char,
}

impl CellCanvas {
    pub fn new(width: usize, height: usize, frame_width: u32, frame_height: u32) -> Self {
        Self {
            width,
            height,
            frame_width: f64::from(frame_width.max(1)),
            frame_height: f64::from(frame_height.max(1)),
            cells: vec![None; width * height],
            glyph: '#',
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel width covered by one cell
    pub fn cell_width(&self) -> f64 {
        self.frame_width / self.width.max(1) as f64
    }

    pub fn cell_height(&self) -> f64 {
        self.frame_height / self.height.max(1) as f64
    }

    /// Map a pixel position to a (column, row) pair, possibly off-grid
    pub fn to_cell(&self, point: Point2<i32>) -> (i32, i32) {
        let col = (f64::from(point.x) / self.cell_width()).floor();
        let row = (f64::from(point.y) / self.cell_height()).floor();
        (col as i32, row as i32)
    }

    pub fn get(&self, col: usize, row: usize) -> Option<Cell> {
        if col < self.width && row < self.height {
            self.cells[row * self.width + col]
        } else {
            None
        }
    }

    /// Set one cell; off-grid positions are ignored
    pub fn plot(&mut self, col: i32, row: i32, cell: Cell) {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return;
        }
        self.cells[row as usize * self.width + col as usize] = Some(cell);
    }

    /// Write text starting at a cell position
    pub fn put_text(&mut self, col: i32, row: i32, text: &str, color: Color) {
        for (i, glyph) in text.chars().enumerate() {
            self.plot(col + i as i32, row, Cell { glyph, color });
        }
    }

    /// Write text centered on a pixel position
    pub fn put_text_centered(&mut self, center: Point2<i32>, text: &str, color: Color) {
        let (col, row) = self.to_cell(center);
        let half = text.chars().count() as i32 / 2;
        self.put_text(col - half, row, text, color);
    }

    /// Fill the cells covering a pixel rectangle
    pub fn fill_rect(&mut self, min: Point2<i32>, max: Point2<i32>, cell: Cell) {
        let (c0, r0) = self.to_cell(min);
        let (c1, r1) = self.to_cell(max);
        let (c0, r0) = (c0.max(0), r0.max(0));
        let c1 = c1.min(self.width as i32 - 1);
        let r1 = r1.min(self.height as i32 - 1);
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.plot(col, row, cell);
            }
        }
    }

    /// Copy the occupied cells of `layer` on top of this canvas.
    ///
    /// Eraser-colored cells count as empty, so erasing on a stroke layer
    /// reveals what is underneath.
    pub fn overlay(&mut self, layer: &CellCanvas) {
        for (dst, src) in self.cells.iter_mut().zip(&layer.cells) {
            if let Some(cell) = src {
                if !cell.color.is_eraser() {
                    *dst = Some(*cell);
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for row in 0..self.height {
            writer.queue(cursor::MoveTo(0, row as u16))?;
            for col in 0..self.width {
                match self.cells[row * self.width + col] {
                    Some(cell) if !cell.color.is_eraser() => {
                        writer.queue(SetForegroundColor(term_color(cell.color)))?;
                        writer.queue(Print(cell.glyph))?;
                    }
                    _ => {
                        writer.queue(Print(' '))?;
                    }
                }
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RasterSurface for CellCanvas {
    /// Bresenham in cell space; thickness is converted from pixels to a
    /// square brush radius in cells. The segment is clipped to the grid
    /// grown by the brush radius first, so only cells near the grid are
    /// stepped.
    fn draw_line(&mut self, from: Point2<i32>, to: Point2<i32>, color: Color, thickness: u32) {
        let cell = Cell {
            glyph: self.glyph,
            color,
        };
        let radius = (f64::from(thickness) / 2.0 / self.cell_width()).round() as i32;

        let (ax, ay) = self.to_cell(from);
        let (bx, by) = self.to_cell(to);
        let reach = f64::from(radius);
        let Some(((x0, y0), (x1, y1))) = clip_segment(
            (f64::from(ax), f64::from(ay)),
            (f64::from(bx), f64::from(by)),
            (-reach, -reach),
            (
                self.width as f64 - 1.0 + reach,
                self.height as f64 - 1.0 + reach,
            ),
        ) else {
            return;
        };

        let (mut x0, mut y0) = (x0.round() as i32, y0.round() as i32);
        let (x1, y1) = (x1.round() as i32, y1.round() as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            for oy in -radius..=radius {
                for ox in -radius..=radius {
                    self.plot(x0 + ox, y0 + oy, cell);
                }
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn clear(&mut self) {
        self.cells.fill(None);
    }
}

type Segment = ((f64, f64), (f64, f64));

/// Cohen-Sutherland clipping of `a`-`b` against the rectangle `min`..=`max`.
/// Returns `None` when the segment misses the rectangle.
fn clip_segment(
    mut a: (f64, f64),
    mut b: (f64, f64),
    min: (f64, f64),
    max: (f64, f64),
) -> Option<Segment> {
    const LEFT: u8 = 1;
    const RIGHT: u8 = 2;
    const TOP: u8 = 4;
    const BOTTOM: u8 = 8;

    let outcode = |(x, y): (f64, f64)| {
        let mut code = 0;
        if x < min.0 {
            code |= LEFT;
        } else if x > max.0 {
            code |= RIGHT;
        }
        if y < min.1 {
            code |= TOP;
        } else if y > max.1 {
            code |= BOTTOM;
        }
        code
    };

    let mut code_a = outcode(a);
    let mut code_b = outcode(b);
    loop {
        if code_a | code_b == 0 {
            return Some((a, b));
        }
        if code_a & code_b != 0 {
            return None;
        }

        // Both endpoints cannot share the outside bit, so the divisor is non-zero
        let out = if code_a != 0 { code_a } else { code_b };
        let ((x0, y0), (x1, y1)) = (a, b);
        let point = if out & TOP != 0 {
            (x0 + (x1 - x0) * (min.1 - y0) / (y1 - y0), min.1)
        } else if out & BOTTOM != 0 {
            (x0 + (x1 - x0) * (max.1 - y0) / (y1 - y0), max.1)
        } else if out & RIGHT != 0 {
            (max.0, y0 + (y1 - y0) * (max.0 - x0) / (x1 - x0))
        } else {
            (min.0, y0 + (y1 - y0) * (min.0 - x0) / (x1 - x0))
        };

        if out == code_a {
            a = point;
            code_a = outcode(a);
        } else {
            b = point;
            code_b = outcode(b);
        }
    }
}

pub fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}
