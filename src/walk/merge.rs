use crate::{
    foundation::core::Rect,
    graph::tree::{LeafId, ProjectionLeaf, ProjectionTree},
    walk::position::{NodePosition, calculate_node_position},
    walk::rects::{RectsWalker, Registration, UpdateType, WalkFlags},
};

/// One incremental recomposition walk over a layer/mask tree.
///
/// Constructed once per triggering change, used for exactly one trip, then
/// handed off or discarded. The walk visits, in one pass:
///
/// - the filthy leaf and every sibling above it (change + need),
/// - each ancestor up to the root, with the siblings above and below that
///   ancestor at every level (the ancestor's merged output changed too),
/// - the siblings below the origin (need only: their content is untouched
///   but compositing above them reads through).
///
/// Change rects register pre-order on the way up and need rects post-order on
/// the way back down, so a descendant's change is always known before an
/// ancestor's need is finalized; the running rect only grows.
pub struct MergeWalker {
    rects: RectsWalker,
    flags: WalkFlags,
}

impl MergeWalker {
    /// Create a walker for one change, clamping all output to `crop_rect`.
    ///
    /// The crop doubles as the dirty seed; use [`Self::with_requested_rect`]
    /// when the changed region is smaller than the region of interest.
    pub fn new(crop_rect: Rect, flags: WalkFlags) -> Self {
        Self {
            rects: RectsWalker::new(crop_rect),
            flags,
        }
    }

    /// Seed the walk with a dirty region smaller than the crop rectangle.
    pub fn with_requested_rect(mut self, rect: Rect) -> Self {
        self.rects.set_requested_rect(rect);
        self
    }

    /// Whether the filthy node's own content must regenerate.
    pub fn update_type(&self) -> UpdateType {
        match self.flags {
            WalkFlags::Default => UpdateType::Update,
            WalkFlags::NoFilthyMode => UpdateType::UpdateNoFilthy,
        }
    }

    /// Perform the full traversal from `start` (the filthy leaf or mask).
    ///
    /// Panics on a stale `start` id; a walk over a mutating tree is outside
    /// this component's contract and must be prevented by the caller.
    #[tracing::instrument(skip(self, tree), fields(crop = ?self.rects.crop_rect()))]
    pub fn start_trip(&mut self, tree: &ProjectionTree, start: LeafId) {
        self.trip(tree.leaf(start));
    }

    /// The ordered annotation sequence produced by the trip.
    pub fn registrations(&self) -> &[Registration] {
        self.rects.registrations()
    }

    /// Change-rect registrations, in sequence order.
    pub fn change_rects(&self) -> impl Iterator<Item = &Registration> {
        self.rects.change_rects()
    }

    /// Need-rect registrations, in sequence order.
    pub fn need_rects(&self) -> impl Iterator<Item = &Registration> {
        self.rects.need_rects()
    }

    /// Consume the walker, handing the plan to the job scheduler.
    pub fn into_registrations(self) -> Vec<Registration> {
        self.rects.into_registrations()
    }

    /// The crop rectangle all registrations were clamped against.
    pub fn crop_rect(&self) -> Rect {
        self.rects.crop_rect()
    }

    /// Entry dispatch. Re-entered for each ancestor once the sibling chain
    /// above it is exhausted: the ancestor's merged output changed, so it is
    /// the filthy-equivalent node at its own level.
    fn trip(&mut self, leaf: ProjectionLeaf<'_>) {
        if leaf.is_mask() {
            self.trip_from_mask(leaf);
            return;
        }
        let root_flag = match self.flags {
            WalkFlags::Default => NodePosition::FILTHY,
            WalkFlags::NoFilthyMode => NodePosition::ABOVE_FILTHY,
        };
        self.visit_higher_node(leaf, root_flag);
        if let Some(prev) = leaf.prev_sibling() {
            self.visit_lower_node(prev);
        }
    }

    /// Upward-and-sideways phase. Siblings above inherit a pure
    /// `ABOVE_FILTHY` flag regardless of the flag this call received.
    fn visit_higher_node(&mut self, leaf: ProjectionLeaf<'_>, inherited: NodePosition) {
        let position = inherited | calculate_node_position(leaf);
        self.rects.register_change_rect(leaf, position);
        if let Some(next) = leaf.next_sibling() {
            self.visit_higher_node(next, NodePosition::ABOVE_FILTHY);
        } else if let Some(parent) = leaf.parent() {
            self.trip(parent);
        }
        self.rects.register_need_rect(leaf, position);
    }

    /// Mask-origin phase. The owning layer's projection must regenerate, but
    /// its paint content did not change: need rect only, no change rect.
    fn trip_from_mask(&mut self, mask: ProjectionLeaf<'_>) {
        self.rects.adjust_masks_change_rect(mask);

        let owner = mask
            .parent()
            .expect("a mask is always attached to a layer");
        if let Some(next) = owner.next_sibling() {
            self.visit_higher_node(next, NodePosition::ABOVE_FILTHY);
        } else if let Some(parent) = owner.parent() {
            self.trip(parent);
        }

        let relationship = match self.flags {
            WalkFlags::Default => NodePosition::FILTHY_PROJECTION,
            WalkFlags::NoFilthyMode => NodePosition::ABOVE_FILTHY,
        };
        self.rects
            .register_need_rect(owner, relationship | calculate_node_position(owner));

        if let Some(prev) = owner.prev_sibling() {
            self.visit_lower_node(prev);
        }
    }

    /// Downward phase: walks the sibling chain below the origin, one level at
    /// a time, mirroring how compositing reads layers bottom-to-top. Every
    /// lower sibling registers, visible or not; whether an invisible leaf is
    /// actually read is the compositor's call, not the planner's. Never
    /// registers change rects and never re-enters the upward phases.
    fn visit_lower_node(&mut self, leaf: ProjectionLeaf<'_>) {
        let position = NodePosition::BELOW_FILTHY | calculate_node_position(leaf);
        self.rects.register_need_rect(leaf, position);
        if let Some(prev) = leaf.prev_sibling() {
            self.visit_lower_node(prev);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/walk/merge.rs"]
mod tests;
