//! Shared foundation: geometry primitives and the error taxonomy.

/// Geometry primitives and rectangle algebra.
pub mod core;
/// Error taxonomy and result alias.
pub mod error;
