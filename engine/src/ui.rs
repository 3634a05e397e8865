/// Axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_size(w: u32, h: u32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Centers a child of `size` inside this rect.
    ///
    /// If `size` exceeds this rect, it is clamped to fit.
    pub fn centered(&self, size: Size) -> Self {
        let w = size.w.min(self.w);
        let h = size.h.min(self.h);
        Self {
            x: self.x.saturating_add(self.w.saturating_sub(w) / 2),
            y: self.y.saturating_add(self.h.saturating_sub(h) / 2),
            w,
            h,
        }
    }

    /// A full-width horizontal band of height `h` centered vertically in this rect.
    pub fn middle_band(&self, h: u32) -> Self {
        self.centered(Size::new(self.w, h))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn fits_in(self, other: Size) -> bool {
        self.w <= other.w && self.h <= other.h
    }
}
