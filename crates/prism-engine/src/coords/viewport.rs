/// Viewport rectangle in physical pixels of a render target.
///
/// The origin is the top-left corner of the target, +Y down, which is the
/// convention of `set_viewport` / `set_scissor_rect` in wgpu.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a whole `width` x `height` target.
    #[inline]
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width / height; `1.0` for degenerate viewports.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.is_valid() { self.width / self.height } else { 1.0 }
    }

    /// Splits into left and right halves. An odd pixel goes to the right half.
    pub fn split_horizontal(self) -> (Self, Self) {
        let left_w = (self.width / 2.0).floor();
        let left = Self::new(self.x, self.y, left_w, self.height);
        let right = Self::new(self.x + left_w, self.y, self.width - left_w, self.height);
        (left, right)
    }

    /// Returns true if the point lies inside (left/top inclusive).
    #[inline]
    pub fn contains(self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    /// Integer scissor rectangle clamped to a `target_w` x `target_h` target.
    ///
    /// Returns `None` when nothing of the viewport lies inside the target.
    pub fn scissor(self, target_w: u32, target_h: u32) -> Option<(u32, u32, u32, u32)> {
        let x = (self.x.max(0.0) as u32).min(target_w);
        let y = (self.y.max(0.0) as u32).min(target_h);
        let x2 = ((self.x + self.width).max(0.0) as u32).min(target_w);
        let y2 = ((self.y + self.height).max(0.0) as u32).min(target_h);
        let (w, h) = (x2.saturating_sub(x), y2.saturating_sub(y));
        if w == 0 || h == 0 { None } else { Some((x, y, w, h)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_even_width() {
        let (l, r) = Viewport::full(1280, 640).split_horizontal();
        assert_eq!(l, Viewport::new(0.0, 0.0, 640.0, 640.0));
        assert_eq!(r, Viewport::new(640.0, 0.0, 640.0, 640.0));
    }

    #[test]
    fn split_odd_width_gives_extra_pixel_to_right() {
        let (l, r) = Viewport::full(101, 10).split_horizontal();
        assert_eq!(l.width, 50.0);
        assert_eq!(r.x, 50.0);
        assert_eq!(r.width, 51.0);
    }

    #[test]
    fn aspect_of_degenerate_is_one() {
        assert_eq!(Viewport::full(0, 10).aspect(), 1.0);
        assert_eq!(Viewport::full(200, 100).aspect(), 2.0);
    }

    #[test]
    fn contains_is_half_open() {
        let v = Viewport::new(10.0, 10.0, 5.0, 5.0);
        assert!(v.contains(10.0, 10.0));
        assert!(!v.contains(15.0, 12.0));
    }

    #[test]
    fn scissor_clamps_to_target() {
        let v = Viewport::new(-4.0, 2.0, 20.0, 20.0);
        assert_eq!(v.scissor(10, 10), Some((0, 2, 10, 8)));
        assert_eq!(Viewport::new(12.0, 0.0, 4.0, 4.0).scissor(10, 10), None);
    }
}
