//! Lamina is an incremental recomposition planner for layered image compositing.
//!
//! A layered image is a tree of layers, groups, and masks. When the pixel
//! content of one node changes (it becomes *filthy*), only part of the tree's
//! cached projections must be recomputed: the filthy node itself, everything
//! composited above it, and the ancestors whose merged output contains it.
//! Layers below are read during recompositing but never recomputed. Lamina
//! decides exactly which nodes need work, over which rectangle, and in what
//! order. It plans the recomposite; it does not touch pixels.
//!
//! # Pipeline overview
//!
//! 1. **Describe**: build a [`ProjectionTree`] mirroring the layer stack
//! 2. **Walk**: `MergeWalker::start_trip` traverses from the filthy leaf
//! 3. **Execute**: hand the ordered [`Registration`] sequence to a job
//!    scheduler, which recomposites in registration order
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: a walk is a pure function of the tree snapshot, the
//!   crop rectangle, and the start leaf.
//! - **Read-only walks**: the walker borrows the tree immutably; concurrent
//!   independent walks over a stable tree are safe by construction.
//! - **Clamp, don't fail**: degenerate crop rectangles yield empty plans,
//!   never errors. Tree-shape invariant violations are programming errors and
//!   are asserted, not returned.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod graph;
mod walk;

pub use foundation::core::{Point, Rect};
pub use foundation::error::{LaminaError, LaminaResult};
pub use graph::tree::{LeafId, LeafKind, ProjectionLeaf, ProjectionTree};
pub use walk::merge::MergeWalker;
pub use walk::position::{NodePosition, calculate_node_position};
pub use walk::rects::{RectRole, RectsWalker, Registration, UpdateType, WalkFlags};
