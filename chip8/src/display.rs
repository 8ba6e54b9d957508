//! Monochrome framebuffer.
use std::fmt::{self, Write};

use crate::constants::*;

/// Row-major display buffer, as handed to renderers.
pub type Chip8DisplayBuffer<'a> = &'a [bool; DISPLAY_BUFFER_SIZE];

/// 64x32 grid of on/off pixels with XOR sprite drawing.
pub struct Display {
    pixels: Box<[bool; DISPLAY_BUFFER_SIZE]>,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            pixels: Box::new([false; DISPLAY_BUFFER_SIZE]),
        }
    }
}

impl Display {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// Pixel state, with the coordinate wrapped onto the screen.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[offset(x, y)]
    }

    pub fn buffer(&self) -> Chip8DisplayBuffer {
        &self.pixels
    }

    /// Draw an 8 pixel wide sprite, one byte per row, at the given coordinate.
    ///
    /// Pixels are XOR'd onto the screen and wrap around both edges.
    /// Returns `true` when any pixel that was on got turned off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let mut is_erased = false;

        for (r, row) in sprite.iter().enumerate() {
            // Each row is 8 bits representing the 8 pixels of the sprite.
            for c in 0..SPRITE_WIDTH {
                let new_px = (*row >> (7 - c)) & 1 != 0;
                if !new_px {
                    continue;
                }

                let d = offset(x + c, y + r);
                let old_px = self.pixels[d];

                // XOR erases a pixel when both the old and new values are both 1.
                is_erased |= old_px;

                self.pixels[d] = !old_px;
            }
        }

        is_erased
    }

    /// Number of pixels currently on.
    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|px| **px).count()
    }
}

#[inline(always)]
fn offset(x: usize, y: usize) -> usize {
    (x & DISPLAY_WIDTH_MASK) + (y & DISPLAY_HEIGHT_MASK) * DISPLAY_WIDTH
}

/// Renders the screen as text, `#` for on and `.` for off.
impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.pixels.chunks(DISPLAY_WIDTH) {
            for px in row {
                f.write_char(if *px { '#' } else { '.' })?;
            }
            f.write_char('\n')?;
        }

        Ok(())
    }
}
