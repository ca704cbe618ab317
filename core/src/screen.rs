use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// The FrameBuffer is indexed as [y][x]; every pixel is either 0 or 1
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// # Screen
/// A 64x32 monochrome frame buffer and a flag recording whether it changed
/// since the host last took a frame.
///
/// Sprites are XORed onto the buffer. Pixels that would land off the edge of
/// the screen are clipped rather than wrapped around.
#[derive(Clone, Debug)]
pub struct Screen {
    frame_buffer: FrameBuffer,
    dirty: bool,
}

impl Screen {
    pub fn new() -> Self {
        Screen {
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            dirty: false,
        }
    }

    pub fn clear(&mut self) {
        self.frame_buffer = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.dirty = true;
    }

    /// XORs `sprite` onto the buffer with its top left corner at (x, y).
    ///
    /// Each byte of `sprite` is one row, most significant bit leftmost.
    /// Returns whether any lit pixel was turned off (a collision).
    ///
    /// # Arguments
    /// * `x` column of the sprite's leftmost pixel
    /// * `y` row of the sprite's top pixel
    /// * `sprite` one byte per row
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let mut collision = false;

        for (row, byte) in sprite.iter().enumerate() {
            let py = y + row;
            if py >= DISPLAY_HEIGHT {
                break;
            }
            for bit in 0..8 {
                let px = x + bit;
                if px >= DISPLAY_WIDTH {
                    break;
                }
                let pixel = (byte >> (7 - bit)) & 0x1;
                if pixel == 0 {
                    continue;
                }
                let target = &mut self.frame_buffer[py][px];
                collision |= *target == 1;
                *target ^= 1;
            }
        }

        self.dirty = true;
        collision
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.frame_buffer[y][x]
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame_buffer
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns a copy of the FrameBuffer if it changed since the last call
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.dirty {
            self.dirty = false;
            Some(self.frame_buffer)
        } else {
            None
        }
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}
