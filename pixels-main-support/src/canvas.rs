use life_grid::{Canvas, Rgba};

/// [`Canvas`] over an RGBA frame buffer, such as `Pixels::frame_mut`.
/// Anything drawn outside the frame is clipped.
pub struct FrameCanvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameCanvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        debug_assert_eq!(frame.len(), 4 * width as usize * height as usize);
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let index = self.pixel_index(x, y)?;
        let mut result = [0; 4];
        result.copy_from_slice(&self.frame[index..index + 4]);
        Some(result)
    }

    fn pixel_index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(4 * (y as usize * self.width as usize + x as usize))
        } else {
            None
        }
    }

    fn set_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(index) = self.pixel_index(x as u32, y as u32) {
            self.frame[index..index + 4].copy_from_slice(&color);
        }
    }
}

impl Canvas for FrameCanvas<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Rgba) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        if x >= x_end {
            return;
        }
        let row_width = self.width as usize;
        for row in y..y_end {
            let start = 4 * (row as usize * row_width + x as usize);
            let end = 4 * (row as usize * row_width + x_end as usize);
            for pixel in self.frame[start..end].chunks_exact_mut(4) {
                pixel.copy_from_slice(&color);
            }
        }
    }

    // Bresenham, all octants.
    fn draw_line(&mut self, from: (u32, u32), to: (u32, u32), color: Rgba) {
        let (mut x, mut y) = (from.0 as i64, from.1 as i64);
        let (x1, y1) = (to.0 as i64, to.1 as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}
