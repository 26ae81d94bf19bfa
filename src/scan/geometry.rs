//! Geometry gate untuk layar scan.
//!
//! Semua rectangle memakai coordinate space yang sama dengan viewport
//! kamera. Gate ini menentukan apakah barcode yang terdeteksi berada
//! sepenuhnya di dalam kotak capture sebelum session boleh lock.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle dalam koordinat viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Rectangle tanpa luas tidak pernah dianggap "inside".
    fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Ukuran viewport kamera (logical pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Cek apakah `inner` berada sepenuhnya di dalam `outer`.
///
/// Perbandingan inklusif: sisi yang persis menempel tetap dihitung
/// "inside", jadi rectangle yang sama dengan target mengembalikan true.
/// Rectangle degenerate (width/height <= 0) selalu false.
pub fn is_fully_inside(inner: &Rect, outer: &Rect) -> bool {
    if inner.is_degenerate() || outer.is_degenerate() {
        return false;
    }

    inner.left >= outer.left
        && inner.right() <= outer.right()
        && inner.top >= outer.top
        && inner.bottom() <= outer.bottom()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contained_rect_is_inside() {
        let target = Rect::new(50.0, 340.0, 300.0, 120.0);
        let inner = Rect::new(60.0, 350.0, 280.0, 100.0);
        assert!(is_fully_inside(&inner, &target));
    }

    #[test]
    fn test_rect_outside_target() {
        let target = Rect::new(50.0, 340.0, 300.0, 120.0);
        let outside = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert!(!is_fully_inside(&outside, &target));
    }

    #[test]
    fn test_partial_overlap_is_not_inside() {
        let target = Rect::new(100.0, 100.0, 200.0, 200.0);
        // Sticks out past the left edge
        let poking = Rect::new(90.0, 150.0, 100.0, 50.0);
        assert!(!is_fully_inside(&poking, &target));
        // Sticks out past the bottom edge
        let poking = Rect::new(150.0, 250.0, 50.0, 100.0);
        assert!(!is_fully_inside(&poking, &target));
    }

    #[test]
    fn test_equal_rect_is_inside() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert!(is_fully_inside(&r, &r));
    }

    #[test]
    fn test_touching_edges_count_as_inside() {
        let target = Rect::new(0.0, 0.0, 100.0, 100.0);
        let flush = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(is_fully_inside(&flush, &target));
    }

    #[test]
    fn test_bigger_than_target_is_not_inside() {
        let target = Rect::new(0.0, 0.0, 100.0, 100.0);
        let wider = Rect::new(-10.0, 10.0, 120.0, 50.0);
        let taller = Rect::new(10.0, -10.0, 50.0, 120.0);
        assert!(!is_fully_inside(&wider, &target));
        assert!(!is_fully_inside(&taller, &target));
    }

    #[test]
    fn test_degenerate_rects_are_never_inside() {
        let target = Rect::new(0.0, 0.0, 100.0, 100.0);
        let zero_width = Rect::new(10.0, 10.0, 0.0, 50.0);
        let zero_height = Rect::new(10.0, 10.0, 50.0, 0.0);
        assert!(!is_fully_inside(&zero_width, &target));
        assert!(!is_fully_inside(&zero_height, &target));
        // A degenerate target rejects everything as well
        let zero_target = Rect::new(0.0, 0.0, 0.0, 0.0);
        assert!(!is_fully_inside(&Rect::new(0.0, 0.0, 1.0, 1.0), &zero_target));
    }
}
