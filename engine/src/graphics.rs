use crate::{
    surface::SurfaceSize,
    ui::{Rect, Size},
};

pub type Color = [u8; 4];

// A tiny 3x5 block font. Lowercase input is folded to uppercase.
const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

fn glyph_advance_x(scale: u32) -> u32 {
    (GLYPH_W + 1) * scale.max(1)
}

fn line_advance_y(scale: u32) -> u32 {
    (GLYPH_H + 1) * scale.max(1)
}

/// Pixel footprint of `text` drawn at `scale` (trailing glyph/line gaps excluded).
pub fn text_size(text: &str, scale: u32) -> Size {
    let scale = scale.max(1);
    let mut widest = 0u32;
    let mut lines = 0u32;
    for line in text.split('\n') {
        lines += 1;
        let chars = line.chars().count() as u32;
        if chars > 0 {
            widest = widest.max(chars * glyph_advance_x(scale) - scale);
        }
    }
    Size::new(widest, lines * line_advance_y(scale) - scale)
}

/// Unified 2D drawing interface.
///
/// Board code only talks to this trait; it does not care whether pixels end up in a window
/// (`pixels` frame) or an offscreen buffer used by tests.
pub trait Renderer2d {
    fn begin_frame(&mut self, size: SurfaceSize);
    fn size(&self) -> SurfaceSize;

    /// Opaque fill.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Alpha-blended rect over existing content (alpha is applied to `color`'s RGB).
    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8);

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32);

    fn draw_text_centered(&mut self, area: Rect, text: &str, color: Color, scale: u32) {
        let at = area.centered(text_size(text, scale));
        self.draw_text_scaled(at.x, at.y, text, color, scale);
    }

    /// Opaque disc, rasterized as one horizontal span per row.
    fn fill_circle(&mut self, cx: u32, cy: u32, radius: u32, color: Color) {
        let r = radius as i64;
        for dy in -r..=r {
            let y = cy as i64 + dy;
            if y < 0 {
                continue;
            }
            let half = isqrt(r * r - dy * dy);
            let x0 = (cx as i64 - half).max(0);
            let x1 = cx as i64 + half + 1;
            self.fill_rect(Rect::new(x0 as u32, y as u32, (x1 - x0) as u32, 1), color);
        }
    }

    fn clear(&mut self, color: Color) {
        let s = self.size();
        self.fill_rect(Rect::from_size(s.width, s.height), color);
    }
}

fn isqrt(v: i64) -> i64 {
    if v <= 0 {
        return 0;
    }
    let mut x = (v as f64).sqrt() as i64;
    while x * x > v {
        x -= 1;
    }
    while (x + 1) * (x + 1) <= v {
        x += 1;
    }
    x
}

/// CPU renderer that draws into an RGBA frame buffer.
pub struct CpuRenderer<'a> {
    frame: &'a mut [u8],
    size: SurfaceSize,
}

impl<'a> CpuRenderer<'a> {
    pub fn new(frame: &'a mut [u8], size: SurfaceSize) -> Self {
        Self { frame, size }
    }

    /// Calls `f` with the clipped byte span of every row covered by `rect`.
    fn for_each_row(&mut self, rect: Rect, mut f: impl FnMut(&mut [u8])) {
        let width = self.size.width;
        let height = self.size.height;

        let max_x = rect.right().min(width);
        let max_y = rect.bottom().min(height);
        if rect.x >= max_x || rect.y >= max_y {
            return;
        }

        let stride = (width as usize).saturating_mul(4);
        if self.frame.len() < stride.saturating_mul(height as usize) {
            return;
        }

        let start = rect.x as usize * 4;
        let end = max_x as usize * 4;
        for y in rect.y..max_y {
            let row = y as usize * stride;
            f(&mut self.frame[row + start..row + end]);
        }
    }
}

impl Renderer2d for CpuRenderer<'_> {
    fn begin_frame(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.for_each_row(rect, |row| {
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
        });
    }

    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8) {
        if alpha == 0 {
            return;
        }
        if alpha == 255 {
            self.fill_rect(rect, color);
            return;
        }

        let a = alpha as u32;
        let inv = 255u32 - a;
        self.for_each_row(rect, |row| {
            for px in row.chunks_exact_mut(4) {
                for c in 0..3 {
                    px[c] = ((px[c] as u32 * inv + color[c] as u32 * a + 127) / 255) as u8;
                }
                px[3] = 255;
            }
        });
    }

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32) {
        let width = self.size.width;
        let height = self.size.height;
        let scale = scale.max(1);
        let adv_x = glyph_advance_x(scale);
        let adv_y = line_advance_y(scale);

        let mut cursor_x = x;
        let mut cursor_y = y;

        for ch in text.chars() {
            match ch {
                '\n' => {
                    cursor_x = x;
                    cursor_y = cursor_y.saturating_add(adv_y);
                    if cursor_y >= height {
                        break;
                    }
                    continue;
                }
                ' ' => {}
                _ => {
                    for (row, bits) in glyph_rows(ch).into_iter().enumerate() {
                        let py = cursor_y.saturating_add(row as u32 * scale);
                        for col in 0..GLYPH_W {
                            if bits & (1u8 << (GLYPH_W - 1 - col)) != 0 {
                                let px = cursor_x.saturating_add(col * scale);
                                self.fill_rect(Rect::new(px, py, scale, scale), color);
                            }
                        }
                    }
                }
            }
            cursor_x = cursor_x.saturating_add(adv_x);
            if cursor_x >= width {
                break;
            }
        }
    }
}

fn glyph_rows(ch: char) -> [u8; GLYPH_H as usize] {
    match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b111, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b111, 0b101, 0b111, 0b110, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        _ => [0b111, 0b001, 0b010, 0b000, 0b010], // '?'
    }
}
