//! The projection-leaf tree: a structural, order-preserving view over the
//! layer/mask stack that walkers query but never mutate.

/// Arena-backed layer/mask tree and its borrowed leaf view.
pub mod tree;
