use crate::color::{self, RGBA};

/// Rendered image, row 0 at the top.
///
/// Pixels hold premultiplied alpha, as composited by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<RGBA>,
}

impl FrameBuffer {
    /// Transparent black frame
    pub fn new(width: usize, height: usize) -> FrameBuffer {
        FrameBuffer {
            width,
            height,
            pixels: vec![color::zero(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Reallocate for a new resolution, content is reset
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != self.resolution() {
            *self = FrameBuffer::new(width, height);
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<RGBA> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(x + y * self.width).copied()
    }

    pub fn pixels(&self) -> &[RGBA] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [RGBA] {
        &mut self.pixels
    }

    /// Quantized straight alpha pixels, 4 bytes per pixel in RGBA order
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .map(|&p| color::unpremultiply(p))
            .flat_map(|p| [p.x, p.y, p.z, p.w])
            .map(color::to_u8)
            .collect()
    }
}
