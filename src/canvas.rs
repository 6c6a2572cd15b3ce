use std::io::Write;

pub type Rgb = (u8, u8, u8);

/// A 2D raster the animation draws into.
///
/// Coordinates and sizes are in surface units. Alpha is the compositing
/// opacity and is clamped to `0.0..=1.0`.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn set_size(&mut self, width: u32, height: u32);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32);
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb, alpha: f32);
}

/// A run of text placed on a terminal cell, drawn over whatever pixels are there.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub row: usize,
    pub col: usize,
    pub text: String,
    pub color: Rgb,
    pub bold: bool,
    pub italic: bool,
}

impl Label {
    pub fn new(row: usize, col: usize, text: impl Into<String>, color: Rgb) -> Self {
        Self {
            row,
            col,
            text: text.into(),
            color,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }
}

/// Half-block pixel canvas. Each terminal cell holds two vertical pixels and
/// each pixel covers `scale` surface units along both axes.
pub struct Canvas {
    width: u32,
    height: u32,
    scale: f32,
    cols: usize,
    rows: usize,
    pixels: Vec<[f32; 3]>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, scale: f32) -> Self {
        let (cols, rows) = Self::grid_size(width, height, scale);
        Self {
            width,
            height,
            scale,
            cols,
            rows,
            pixels: vec![[0.0; 3]; cols * rows],
        }
    }

    fn grid_size(width: u32, height: u32, scale: f32) -> (usize, usize) {
        (
            (width as f32 / scale).ceil() as usize,
            (height as f32 / scale).ceil() as usize,
        )
    }

    /// Width of the pixel grid (one pixel per terminal column).
    pub fn pixel_width(&self) -> usize {
        self.cols
    }

    /// Height of the pixel grid (two pixels per terminal row).
    pub fn pixel_height(&self) -> usize {
        self.rows
    }

    pub fn pixel(&self, px: usize, py: usize) -> Option<Rgb> {
        if px < self.cols && py < self.rows {
            Some(quantize(self.pixels[py * self.cols + px]))
        } else {
            None
        }
    }

    pub fn clear(&mut self, color: Rgb) {
        let value = [color.0 as f32, color.1 as f32, color.2 as f32];
        self.pixels.fill(value);
    }

    #[inline]
    fn blend(&mut self, px: usize, py: usize, color: Rgb, alpha: f32) {
        let p = &mut self.pixels[py * self.cols + px];
        let inv = 1.0 - alpha;
        p[0] = p[0] * inv + color.0 as f32 * alpha;
        p[1] = p[1] * inv + color.1 as f32 * alpha;
        p[2] = p[2] * inv + color.2 as f32 * alpha;
    }

    /// Append one full ANSI frame to `buf`: the pixel grid as `▄` cells, then
    /// every label positioned over it.
    pub fn encode(&self, buf: &mut Vec<u8>, labels: &[Label]) -> std::io::Result<()> {
        buf.extend_from_slice(b"\x1b[H"); // Move to home

        let bg_color = crate::get_bg_color();
        let mut prev_top: Rgb = (255, 255, 255);
        let mut prev_bot: Rgb = (255, 255, 255);

        for y in (0..self.rows).step_by(2) {
            for x in 0..self.cols {
                let top = self.pixel(x, y).unwrap_or(bg_color);
                let bot = self.pixel(x, y + 1).unwrap_or(bg_color);

                // Only emit color codes if changed
                if top != prev_top {
                    write!(buf, "\x1b[48;2;{};{};{}m", top.0, top.1, top.2)?;
                    prev_top = top;
                }
                if bot != prev_bot {
                    write!(buf, "\x1b[38;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    prev_bot = bot;
                }
                buf.extend_from_slice("▄".as_bytes());
            }
            buf.extend_from_slice(b"\x1b[0m");
            prev_top = (255, 255, 255);
            prev_bot = (255, 255, 255);
            if y + 2 < self.rows {
                buf.extend_from_slice(b"\r\n");
            }
        }

        let cell_rows = self.rows.div_ceil(2);
        for label in labels {
            if label.row >= cell_rows || label.col >= self.cols {
                continue;
            }
            let room = self.cols - label.col;
            let text: String = label.text.chars().take(room).collect();
            let under = self.cell_color(label.col, label.row, bg_color);

            write!(buf, "\x1b[{};{}H", label.row + 1, label.col + 1)?;
            write!(buf, "\x1b[48;2;{};{};{}m", under.0, under.1, under.2)?;
            write!(buf, "\x1b[38;2;{};{};{}m", label.color.0, label.color.1, label.color.2)?;
            if label.bold {
                buf.extend_from_slice(b"\x1b[1m");
            }
            if label.italic {
                buf.extend_from_slice(b"\x1b[3m");
            }
            buf.extend_from_slice(text.as_bytes());
            buf.extend_from_slice(b"\x1b[0m");
        }
        Ok(())
    }

    // Average of the two pixels sharing a cell.
    fn cell_color(&self, col: usize, row: usize, fallback: Rgb) -> Rgb {
        let top = self.pixel(col, row * 2).unwrap_or(fallback);
        let bot = self.pixel(col, row * 2 + 1).unwrap_or(fallback);
        (
            ((top.0 as u16 + bot.0 as u16) / 2) as u8,
            ((top.1 as u16 + bot.1 as u16) / 2) as u8,
            ((top.2 as u16 + bot.2 as u16) / 2) as u8,
        )
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    // Resizing drops the pixel contents, as an HTML canvas does.
    fn set_size(&mut self, width: u32, height: u32) {
        let (cols, rows) = Self::grid_size(width, height, self.scale);
        self.width = width;
        self.height = height;
        self.cols = cols;
        self.rows = rows;
        self.pixels = vec![[0.0; 3]; cols * rows];
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let x0 = (x / self.scale).floor().max(0.0) as usize;
        let y0 = (y / self.scale).floor().max(0.0) as usize;
        let x1 = (((x + w) / self.scale).ceil().max(0.0) as usize).min(self.cols);
        let y1 = (((y + h) / self.scale).ceil().max(0.0) as usize).min(self.rows);

        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, alpha);
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let pcx = cx / self.scale;
        let pcy = cy / self.scale;
        let pr = radius / self.scale;

        // Sub-pixel spark: light the pixel under the centre
        if pr < 0.75 {
            if pcx >= 0.0 && pcy >= 0.0 {
                let (px, py) = (pcx as usize, pcy as usize);
                if px < self.cols && py < self.rows {
                    self.blend(px, py, color, alpha);
                }
            }
            return;
        }

        let x0 = (pcx - pr).floor().max(0.0) as usize;
        let y0 = (pcy - pr).floor().max(0.0) as usize;
        let x1 = ((pcx + pr).ceil().max(0.0) as usize).min(self.cols);
        let y1 = ((pcy + pr).ceil().max(0.0) as usize).min(self.rows);
        let r2 = pr * pr;

        for py in y0..y1 {
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - pcx;
                let dy = py as f32 + 0.5 - pcy;
                if dx * dx + dy * dy <= r2 {
                    self.blend(px, py, color, alpha);
                }
            }
        }
    }
}

fn quantize(p: [f32; 3]) -> Rgb {
    (
        p[0].round().clamp(0.0, 255.0) as u8,
        p[1].round().clamp(0.0, 255.0) as u8,
        p[2].round().clamp(0.0, 255.0) as u8,
    )
}
