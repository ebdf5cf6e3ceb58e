/// Axis-aligned rectangle in CSS pixels unless stated otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Re-expresses this rect relative to `origin`'s top-left corner.
    pub fn relative_to(&self, origin: &Rect) -> Rect {
        Rect::new(self.x - origin.x, self.y - origin.y, self.width, self.height)
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Shrinks the rect by per-side insets, clamping at zero size.
    pub fn inset(&self, top: f32, right: f32, bottom: f32, left: f32) -> Rect {
        Rect::new(
            self.x + left,
            self.y + top,
            (self.width - left - right).max(0.0),
            (self.height - top - bottom).max(0.0),
        )
    }

    pub fn scale(&self, factor: f32) -> Rect {
        Rect::new(self.x * factor, self.y * factor, self.width * factor, self.height * factor)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0.0 { 0.0 } else { self.width / self.height }
    }

    /// Largest size with this aspect ratio that fits inside `bounds`.
    pub fn fit_within(&self, bounds: Size) -> Size {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Size::zero();
        }
        let scale = (bounds.width / self.width).min(bounds.height / self.height);
        Size::new(self.width * scale, self.height * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_to_subtracts_origin() {
        let container = Rect::new(100.0, 50.0, 1280.0, 720.0);
        let child = Rect::new(140.0, 90.0, 200.0, 40.0);
        assert_eq!(child.relative_to(&container), Rect::new(40.0, 40.0, 200.0, 40.0));
    }

    #[test]
    fn inset_never_goes_negative() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).inset(8.0, 8.0, 8.0, 8.0);
        assert_eq!(r.width, 0.0);
        assert!(r.is_empty());
    }

    #[test]
    fn fit_within_keeps_aspect_ratio() {
        let fitted = Size::new(1280.0, 720.0).fit_within(Size::new(800.0, 800.0));
        assert!((fitted.width - 800.0).abs() < 1e-3);
        assert!((fitted.height - 450.0).abs() < 1e-3);
    }
}
