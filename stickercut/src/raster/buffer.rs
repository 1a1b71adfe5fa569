use crate::raster::{ALPHA_THRESHOLD, WHITE_THRESHOLD};
use crate::{CutlineError, Result};

/// Row-major RGBA8 pixel buffer
#[derive(Clone, Debug, PartialEq)]
pub struct RgbaBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbaBuffer {
    /// Wraps `data`, which must hold exactly `width * height * 4` bytes
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| CutlineError::InvalidRaster(format!("{width}x{height} overflows")))?;
        if data.len() != expected {
            return Err(CutlineError::InvalidRaster(format!(
                "expected {expected} bytes for {width}x{height} RGBA, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer of the given size with every pixel set to `rgba`
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(width * height * 4)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let i = (y * self.width + x) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }

    /// Sets every pixel of the half-open rectangle `[x0, x1) x [y0, y1)`, clipped to the buffer
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, rgba: [u8; 4]) {
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                self.set_pixel(x, y, rgba);
            }
        }
    }

    /// Alpha of at least 128 and not near-white. Out-of-bounds coordinates are never opaque.
    pub fn is_opaque(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        let [r, g, b, a] = self.pixel(x as usize, y as usize);
        a >= ALPHA_THRESHOLD && !(r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD)
    }
}
