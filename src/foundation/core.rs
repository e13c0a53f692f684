pub use kurbo::{Point, Rect};

/// Grow `rect` by `margin` device units on every side.
///
/// A zero margin returns the rect unchanged, so degenerate rects stay
/// degenerate unless a node really carries an enlargement policy.
pub(crate) fn inflated(rect: Rect, margin: f64) -> Rect {
    if margin > 0.0 {
        rect.inflate(margin, margin)
    } else {
        rect
    }
}

/// Clamp `rect` against `crop`, returning `None` when nothing remains.
///
/// `kurbo::Rect::intersect` yields an inverted rect for disjoint inputs;
/// the width/height checks treat that the same as an empty overlap.
pub(crate) fn clamped_nonempty(rect: Rect, crop: Rect) -> Option<Rect> {
    let r = rect.intersect(crop);
    (r.width() > 0.0 && r.height() > 0.0).then_some(r)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
