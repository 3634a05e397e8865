use crate::graphics::{CpuRenderer, Renderer2d};
use crate::surface::SurfaceSize;

use pixels::Pixels;

/// Headful presenter built on `pixels`.
///
/// The frame buffer always matches the logical board surface; `pixels` scales it onto the
/// window surface, so pointer positions must be mapped back through `window_to_surface`.
pub struct PixelsRenderer2d {
    pixels: Pixels,
    size: SurfaceSize,
}

impl PixelsRenderer2d {
    pub fn new(mut pixels: Pixels, size: SurfaceSize) -> Result<Self, pixels::Error> {
        pixels.resize_buffer(size.width, size.height)?;
        Ok(Self { pixels, size })
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Resizes the logical frame buffer (the drawing surface).
    pub fn resize_buffer(&mut self, size: SurfaceSize) -> Result<(), pixels::Error> {
        if size.is_empty() {
            return Ok(());
        }
        self.size = size;
        self.pixels.resize_buffer(size.width, size.height)?;
        Ok(())
    }

    /// Resizes the window-backed presentation surface.
    pub fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), pixels::Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)?;
        Ok(())
    }

    /// Maps a physical window position to fractional surface coordinates.
    ///
    /// Returns `None` when the position falls outside the drawn surface.
    pub fn window_to_surface(&self, x: f64, y: f64) -> Option<(f32, f32)> {
        match self.pixels.window_pos_to_pixel((x as f32, y as f32)) {
            Ok((px, py)) => Some((px as f32, py as f32)),
            Err(_) => None,
        }
    }

    pub fn draw_frame<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut dyn Renderer2d) -> R,
    {
        let mut cpu = CpuRenderer::new(self.pixels.frame_mut(), self.size);
        cpu.begin_frame(self.size);
        f(&mut cpu)
    }

    pub fn present(&mut self) -> Result<(), pixels::Error> {
        self.pixels.render()
    }
}
