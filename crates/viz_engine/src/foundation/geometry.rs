//! 2D geometry primitives
//!
//! Provides the axis-aligned rectangle used for clip regions, layout
//! bounds, and dirty-region accumulation throughout the scene graph.

/// Axis-aligned rectangle in surface coordinates
///
/// The origin sits at the top-left corner, with `width` and `height`
/// extending right and down. Both extents are kept non-negative by all
/// operations defined here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Horizontal extent, never negative
    pub width: f32,
    /// Vertical extent, never negative
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from origin and extents
    ///
    /// Negative extents are clamped to zero.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Create a rectangle at the origin with the given extents
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point as an (x, y) pair
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Check whether the rectangle covers no area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if this rectangle contains a point
    ///
    /// Points on the edges count as contained.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() &&
        y >= self.y && y <= self.bottom()
    }

    /// Check if this rectangle overlaps another
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right() && self.right() >= other.x &&
        self.y <= other.bottom() && self.bottom() >= other.y
    }

    /// Smallest rectangle containing both this rectangle and another
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        Rect::new(x, y, right - x, bottom - y)
    }

    /// Overlapping region of this rectangle and another
    ///
    /// Disjoint rectangles produce an empty result with zero extents,
    /// never negative ones.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        Rect::new(x, y, right - x, bottom - y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);

        assert!(rect.contains(15.0, 15.0));
        assert!(rect.contains(10.0, 10.0));
        assert!(rect.contains(30.0, 30.0));
        assert!(!rect.contains(9.0, 15.0));
        assert!(!rect.contains(15.0, 31.0));
    }

    #[test]
    fn test_rect_negative_extents_clamped() {
        let rect = Rect::new(5.0, 5.0, -3.0, 4.0);

        assert_eq!(rect.width, 0.0);
        assert_eq!(rect.height, 4.0);
        assert!(rect.is_empty());
    }

    #[test]
    fn test_union_contains_both() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 10.0, 10.0);
        let u = a.union(&b);

        assert!(u.contains(a.x, a.y));
        assert!(u.contains(a.right(), a.bottom()));
        assert!(u.contains(b.x, b.y));
        assert!(u.contains(b.right(), b.bottom()));
        assert!(u.contains(5.0, 5.0));
        assert!(u.contains(25.0, 10.0));
    }

    #[test]
    fn test_intersection_of_overlapping() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let i = a.intersection(&b);

        assert_eq!(i, Rect::new(5.0, 5.0, 5.0, 5.0));
        assert!(a.contains(i.x, i.y));
        assert!(b.contains(i.x, i.y));
    }

    #[test]
    fn test_intersection_of_disjoint_is_empty() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(50.0, 50.0, 10.0, 10.0);
        let i = a.intersection(&b);

        assert!(i.is_empty());
        assert!(i.width >= 0.0 && i.height >= 0.0);
    }

    #[test]
    fn test_intersection_of_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let i = a.intersection(&b);

        assert!(a.intersects(&b));
        assert!(i.is_empty());
        assert_eq!(i.x, 10.0);
    }

    #[test]
    fn test_intersection_inside_both_inputs() {
        let a = Rect::new(2.0, 3.0, 8.0, 6.0);
        let b = Rect::new(4.0, 1.0, 10.0, 5.0);
        let i = a.intersection(&b);

        let (cx, cy) = i.center();
        assert!(a.contains(cx, cy));
        assert!(b.contains(cx, cy));
    }
}
