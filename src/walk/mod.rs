//! Recomposition walks: traversal policy, rect accumulation, and the
//! position bitmask consumed by the compositing stage.

/// The merge walk traversal policy.
pub mod merge;
/// `NodePosition` bitmask and positional helpers.
pub mod position;
/// Rect accumulation: crop clamping, the running change rect, and the
/// ordered registration sequence.
pub mod rects;
