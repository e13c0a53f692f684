use crate::graph::tree::ProjectionLeaf;

bitflags::bitflags! {
    /// Topological relationship of a visited leaf to the filthy node,
    /// OR-combined with sibling-position bits.
    ///
    /// Exactly one relationship flag (`FILTHY`, `FILTHY_PROJECTION`,
    /// `ABOVE_FILTHY`, `BELOW_FILTHY`) applies per leaf per walk; the
    /// positional bits combine freely with it and with each other.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
    pub struct NodePosition: u8 {
        /// The node whose pixel content changed.
        const FILTHY = 1 << 0;
        /// A layer whose projection must regenerate because one of its masks
        /// changed; its own paint content is untouched.
        const FILTHY_PROJECTION = 1 << 1;
        /// Composited above the filthy node in z-order.
        const ABOVE_FILTHY = 1 << 2;
        /// Composited below the filthy node; read-only during recompositing.
        const BELOW_FILTHY = 1 << 3;
        /// No sibling above this leaf.
        const TOPMOST = 1 << 4;
        /// No sibling below this leaf.
        const BOTTOMMOST = 1 << 5;
    }
}

impl NodePosition {
    /// The relationship class alone, positional bits stripped.
    pub fn relationship(self) -> NodePosition {
        self & (Self::FILTHY | Self::FILTHY_PROJECTION | Self::ABOVE_FILTHY | Self::BELOW_FILTHY)
    }

    /// True when the leaf has no sibling above it.
    pub fn is_topmost(self) -> bool {
        self.contains(Self::TOPMOST)
    }

    /// True when the leaf has no sibling below it.
    pub fn is_bottommost(self) -> bool {
        self.contains(Self::BOTTOMMOST)
    }
}

/// Positional bits for `leaf` within its sibling chain: topmost when there is
/// no next sibling, bottommost when there is no previous sibling.
pub fn calculate_node_position(leaf: ProjectionLeaf<'_>) -> NodePosition {
    let mut position = NodePosition::empty();
    if leaf.next_sibling().is_none() {
        position |= NodePosition::TOPMOST;
    }
    if leaf.prev_sibling().is_none() {
        position |= NodePosition::BOTTOMMOST;
    }
    position
}

#[cfg(test)]
#[path = "../../tests/unit/walk/position.rs"]
mod tests;
