//! Collision detection between birds and pipe segments
//!
//! Everything here is a full 2-D AABB test. Touching edges don't count as a
//! hit, so a bird resting exactly on a segment boundary survives.

use super::rect::Rect;

/// Check whether two rectangles overlap on both axes
#[inline]
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}

/// Check a bird's rectangle against both segments of a pipe
pub fn hits_pipe(bird: &Rect, top: &Rect, bottom: &Rect) -> bool {
    rects_overlap(bird, top) || rects_overlap(bird, bottom)
}
