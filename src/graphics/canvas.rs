//! Raster canvas for hosts without a graphics window
//!
//! Applies `DrawCommand`s to a grid of palette indices and renders a coarse
//! text preview. Turtle coordinates are centre-origin; the canvas maps them
//! onto pixel columns and rows with (0, 0) in the middle.

use super::DrawCommand;

/// Graphics canvas for drawing operations
#[derive(Debug, Clone)]
pub struct Canvas {
    /// Palette index per pixel, row-major
    pixels: Vec<u8>,
    /// Canvas width in pixels
    width: usize,
    /// Canvas height in pixels
    height: usize,
    background: u8,
}

impl Canvas {
    /// Create a canvas filled with the background colour
    pub fn new(width: usize, height: usize, background: u8) -> Self {
        Self {
            pixels: vec![background; width * height],
            width,
            height,
            background,
        }
    }

    /// Apply one drawing delta
    pub fn apply(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Line {
                from,
                to,
                color,
                thickness,
            } => {
                let thickness = self.brush(*thickness);
                let from = self.to_canvas(from.x, from.y);
                let to = self.to_canvas(to.x, to.y);
                let margin = f64::from(thickness);
                let Some((from, to)) = self.clip_segment(from, to, margin) else {
                    return;
                };
                // Clipped endpoints lie within a brush of the canvas, so the
                // integer walk below stays short
                self.draw_line(
                    from.0.round() as i64,
                    from.1.round() as i64,
                    to.0.round() as i64,
                    to.1.round() as i64,
                    *color,
                    thickness,
                );
            }
            DrawCommand::Circle {
                center,
                radius,
                color,
                thickness,
            } => {
                let thickness = self.brush(*thickness);
                let (cx, cy) = self.to_canvas(center.x, center.y);
                self.draw_circle(cx, cy, *radius, *color, thickness);
            }
            DrawCommand::Clear { color } => self.clear(*color),
        }
    }

    /// Repaint every pixel
    pub fn clear(&mut self, color: u8) {
        self.background = color;
        self.pixels.fill(color);
    }

    /// Get the palette index at a pixel
    pub fn get_pixel(&self, x: i64, y: i64) -> Option<u8> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Palette index at turtle coordinates
    pub fn color_at(&self, x: f64, y: f64) -> Option<u8> {
        let (px, py) = self.to_canvas(x, y);
        if !px.is_finite() || !py.is_finite() {
            return None;
        }
        // `as` saturates, and `index` rejects anything off the grid
        self.get_pixel(px.round() as i64, py.round() as i64)
    }

    /// Number of pixels that differ from the background
    pub fn painted_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| **p != self.background).count()
    }

    /// Brushes wider than twice the canvas already cover it from any pixel
    fn brush(&self, thickness: u32) -> u32 {
        let span = self.width.max(self.height).saturating_mul(2).saturating_add(1);
        let limit = u32::try_from(span).unwrap_or(u32::MAX);
        thickness.clamp(1, limit)
    }

    /// Shift centre-origin turtle coordinates onto the pixel grid
    fn to_canvas(&self, x: f64, y: f64) -> (f64, f64) {
        (x + (self.width / 2) as f64, y + (self.height / 2) as f64)
    }

    /// Liang-Barsky clip of a segment against the canvas grown by `margin`
    fn clip_segment(
        &self,
        from: (f64, f64),
        to: (f64, f64),
        margin: f64,
    ) -> Option<((f64, f64), (f64, f64))> {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        if !dx.is_finite() || !dy.is_finite() {
            return None;
        }

        let (min_x, min_y) = (-margin, -margin);
        let max_x = self.width as f64 - 1.0 + margin;
        let max_y = self.height as f64 - 1.0 + margin;

        let mut t0: f64 = 0.0;
        let mut t1: f64 = 1.0;
        for (p, q) in [
            (-dx, from.0 - min_x),
            (dx, max_x - from.0),
            (-dy, from.1 - min_y),
            (dy, max_y - from.1),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }

        Some((
            (from.0 + t0 * dx, from.1 + t0 * dy),
            (from.0 + t1 * dx, from.1 + t1 * dy),
        ))
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Paint a square brush of the given thickness centred on a pixel
    fn stamp(&mut self, x: i64, y: i64, color: u8, thickness: u32) {
        let size = i64::from(thickness.max(1));
        let offset = (size - 1) / 2;
        let (left, top) = (x - offset, y - offset);
        // Only visit the part of the brush that lands on the grid
        let (x_start, x_end) = (left.max(0), (left + size).min(self.width as i64));
        let (y_start, y_end) = (top.max(0), (top + size).min(self.height as i64));
        if x_start >= x_end {
            return;
        }
        for py in y_start..y_end {
            let row = py as usize * self.width;
            self.pixels[row + x_start as usize..row + x_end as usize].fill(color);
        }
    }

    /// Stamp at fractional pixel coordinates, ignoring points beyond the brush margin
    fn plot(&mut self, x: f64, y: f64, color: u8, thickness: u32) {
        let margin = f64::from(thickness);
        let inside = |v: f64, size: usize| v >= -margin && v <= size as f64 + margin;
        if inside(x, self.width) && inside(y, self.height) {
            self.stamp(x.round() as i64, y.round() as i64, color, thickness);
        }
    }

    /// Draw a line using Bresenham's algorithm
    fn draw_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: u8, thickness: u32) {
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.stamp(x, y, color, thickness);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw a circle given its centre in pixel coordinates
    ///
    /// Circles whose bounding box misses the canvas are skipped. Circles
    /// larger than the canvas are traced column by column and row by row,
    /// so the work never depends on the radius.
    fn draw_circle(&mut self, cx: f64, cy: f64, radius: f64, color: u8, thickness: u32) {
        if !cx.is_finite() || !cy.is_finite() || !radius.is_finite() || radius.round() <= 0.0 {
            return;
        }

        let reach = radius + f64::from(thickness);
        if cx + reach < 0.0
            || cy + reach < 0.0
            || cx - reach > self.width as f64
            || cy - reach > self.height as f64
        {
            return;
        }

        if radius > (self.width + self.height) as f64 {
            self.trace_circle(cx, cy, radius, color, thickness);
        } else {
            self.midpoint_circle(
                cx.round() as i64,
                cy.round() as i64,
                radius.round() as i64,
                color,
                thickness,
            );
        }
    }

    /// Visit each pixel column and row once and plot where the circle crosses it
    fn trace_circle(&mut self, cx: f64, cy: f64, radius: f64, color: u8, thickness: u32) {
        let squared = radius * radius;
        for x in 0..self.width {
            let dx = x as f64 - cx;
            let span = squared - dx * dx;
            if span >= 0.0 {
                let dy = span.sqrt();
                self.plot(x as f64, cy - dy, color, thickness);
                self.plot(x as f64, cy + dy, color, thickness);
            }
        }
        for y in 0..self.height {
            let dy = y as f64 - cy;
            let span = squared - dy * dy;
            if span >= 0.0 {
                let dx = span.sqrt();
                self.plot(cx - dx, y as f64, color, thickness);
                self.plot(cx + dx, y as f64, color, thickness);
            }
        }
    }

    /// Draw a circle using the midpoint circle algorithm
    fn midpoint_circle(&mut self, cx: i64, cy: i64, radius: i64, color: u8, thickness: u32) {
        let mut x = radius;
        let mut y = 0;
        let mut err = 0;

        while x >= y {
            // Draw 8 octants
            for (px, py) in [
                (cx + x, cy + y),
                (cx + y, cy + x),
                (cx - y, cy + x),
                (cx - x, cy + y),
                (cx - x, cy - y),
                (cx - y, cy - x),
                (cx + y, cy - x),
                (cx + x, cy - y),
            ] {
                self.stamp(px, py, color, thickness);
            }

            y += 1;
            if err <= 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    /// Render a `columns` x `rows` text preview; painted blocks show as `#`
    pub fn render_text(&self, columns: usize, rows: usize) -> String {
        let columns = columns.clamp(1, self.width.max(1));
        let rows = rows.clamp(1, self.height.max(1));
        let mut output = String::with_capacity((columns + 1) * rows);

        for row in 0..rows {
            let y_start = row * self.height / rows;
            let y_end = ((row + 1) * self.height / rows).max(y_start + 1);
            for column in 0..columns {
                let x_start = column * self.width / columns;
                let x_end = ((column + 1) * self.width / columns).max(x_start + 1);
                let painted = (y_start..y_end.min(self.height)).any(|y| {
                    (x_start..x_end.min(self.width))
                        .any(|x| self.pixels[y * self.width + x] != self.background)
                });
                output.push(if painted { '#' } else { '.' });
            }
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::Point;

    fn line(from: (f64, f64), to: (f64, f64), thickness: u32) -> DrawCommand {
        DrawCommand::Line {
            from: Point::new(from.0, from.1),
            to: Point::new(to.0, to.1),
            color: 1,
            thickness,
        }
    }

    #[test]
    fn test_line_pixels() {
        let mut canvas = Canvas::new(100, 100, 0);
        canvas.apply(&line((0.0, 0.0), (10.0, 0.0), 1));
        assert_eq!(canvas.color_at(0.0, 0.0), Some(1));
        assert_eq!(canvas.color_at(10.0, 0.0), Some(1));
        assert_eq!(canvas.color_at(11.0, 0.0), Some(0));
        assert_eq!(canvas.painted_pixels(), 11);
    }

    #[test]
    fn test_thick_line() {
        let mut canvas = Canvas::new(100, 100, 0);
        canvas.apply(&line((0.0, 0.0), (9.0, 0.0), 3));
        // 3x3 brush: x -1..=10, y -1..=1
        assert_eq!(canvas.painted_pixels(), 36);
        assert_eq!(canvas.color_at(5.0, 1.0), Some(1));
        assert_eq!(canvas.color_at(5.0, -1.0), Some(1));
    }

    #[test]
    fn test_off_canvas_is_clipped() {
        let mut canvas = Canvas::new(20, 20, 0);
        canvas.apply(&line((0.0, 0.0), (500.0, 0.0), 1));
        assert_eq!(canvas.painted_pixels(), 10);
        assert_eq!(canvas.get_pixel(-1, 0), None);
    }

    #[test]
    fn test_far_segment_is_clipped_before_rasterising() {
        let mut canvas = Canvas::new(100, 100, 0);
        canvas.apply(&line((0.0, 0.0), (1e300, 0.0), 1));
        // Only the run from the centre to the right edge is visited
        assert_eq!(canvas.painted_pixels(), 50);
        assert_eq!(canvas.color_at(49.0, 0.0), Some(1));
        assert_eq!(canvas.color_at(1e300, 0.0), None);

        canvas.apply(&line((-1e300, 5e299), (-1e299, 1e300), 1));
        canvas.apply(&line((0.0, 0.0), (f64::INFINITY, 0.0), 1));
        assert_eq!(canvas.painted_pixels(), 50);
    }

    #[test]
    fn test_huge_circle_traces_visible_arc() {
        let mut canvas = Canvas::new(100, 100, 0);
        // Passes through the origin, bulging downwards by a fraction of a pixel
        canvas.apply(&DrawCommand::Circle {
            center: Point::new(0.0, 1e12),
            radius: 1e12,
            color: 2,
            thickness: 1,
        });
        assert_eq!(canvas.color_at(-50.0, 0.0), Some(2));
        assert_eq!(canvas.color_at(49.0, 0.0), Some(2));
        assert_eq!(canvas.color_at(0.0, 10.0), Some(0));
        assert_eq!(canvas.painted_pixels(), 100);

        // Far away or enclosing the whole canvas: nothing to paint
        canvas.apply(&DrawCommand::Circle {
            center: Point::new(1e300, 0.0),
            radius: 1e12,
            color: 3,
            thickness: 1,
        });
        canvas.apply(&DrawCommand::Circle {
            center: Point::ORIGIN,
            radius: 1e12,
            color: 3,
            thickness: 1,
        });
        assert_eq!(canvas.painted_pixels(), 100);
    }

    #[test]
    fn test_wide_brush_is_bounded_by_canvas() {
        let mut canvas = Canvas::new(10, 10, 0);
        canvas.apply(&line((0.0, 0.0), (1e9, 0.0), u32::MAX));
        assert_eq!(canvas.painted_pixels(), 100);
    }

    #[test]
    fn test_circle_and_clear() {
        let mut canvas = Canvas::new(100, 100, 0);
        canvas.apply(&DrawCommand::Circle {
            center: Point::ORIGIN,
            radius: 10.0,
            color: 2,
            thickness: 1,
        });
        assert_eq!(canvas.color_at(10.0, 0.0), Some(2));
        assert_eq!(canvas.color_at(0.0, -10.0), Some(2));
        assert_eq!(canvas.color_at(0.0, 0.0), Some(0));

        canvas.apply(&DrawCommand::Clear { color: 6 });
        assert_eq!(canvas.painted_pixels(), 0);
        assert_eq!(canvas.color_at(10.0, 0.0), Some(6));
    }

    #[test]
    fn test_render_text() {
        let mut canvas = Canvas::new(4, 4, 0);
        canvas.apply(&line((-2.0, -2.0), (1.0, -2.0), 1));
        assert_eq!(canvas.render_text(4, 4), "####\n....\n....\n....\n");
    }
}
