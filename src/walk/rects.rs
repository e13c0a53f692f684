use crate::{
    foundation::core::{Rect, clamped_nonempty, inflated},
    graph::tree::{LeafId, ProjectionLeaf},
    walk::position::NodePosition,
};

/// Which traversal mode produced a walk's registrations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UpdateType {
    /// Normal recomposite: regenerate the filthy node's own content too.
    Update,
    /// Only mask-driven side effects propagate; the filthy node's own pixel
    /// content is already correct.
    UpdateNoFilthy,
}

/// Constructor flags selecting a [`MergeWalker`](crate::MergeWalker)'s mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum WalkFlags {
    /// Normal walk: the start leaf's own content regenerates.
    #[default]
    Default,
    /// No-filthy walk: the start leaf is registered as if it sat above the
    /// change, its own content untouched.
    NoFilthyMode,
}

/// Whether a registration records dirty output or required input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RectRole {
    /// The leaf's output changed over this region.
    Change,
    /// The leaf must be given this input region before it can recompute.
    Need,
}

/// One annotation in a walk's ordered output sequence.
///
/// The external job scheduler consumes registrations in sequence order; that
/// order encodes the bottom-up, then-group-by-group recomposite plan.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Registration {
    /// The leaf this annotation applies to.
    pub leaf: LeafId,
    /// Crop-clamped region, in image coordinates.
    pub rect: Rect,
    /// Topological relationship to the filthy node.
    pub position: NodePosition,
    /// Dirty output vs required input.
    pub role: RectRole,
}

/// Crop ownership and rect accumulation shared by walkers.
///
/// Holds the crop rectangle, the running change rect (which only grows as the
/// walk propagates), and the append-only registration sequence. Both register
/// primitives clamp against the crop and record nothing when the clamped
/// region is empty, so a degenerate crop produces an empty plan.
#[derive(Clone, Debug)]
pub struct RectsWalker {
    crop_rect: Rect,
    change_rect: Rect,
    registrations: Vec<Registration>,
}

impl RectsWalker {
    /// Create a walker whose dirty seed is the crop rectangle itself.
    pub fn new(crop_rect: Rect) -> Self {
        Self {
            crop_rect,
            change_rect: crop_rect,
            registrations: Vec::new(),
        }
    }

    /// Seed the running change rect with a dirty region smaller than the
    /// crop. Must be called before the walk starts.
    pub(crate) fn set_requested_rect(&mut self, rect: Rect) {
        debug_assert!(
            self.registrations.is_empty(),
            "requested rect must be seeded before the walk starts"
        );
        self.change_rect = rect;
    }

    /// The crop rectangle every registration is clamped against.
    pub fn crop_rect(&self) -> Rect {
        self.crop_rect
    }

    /// Record that `leaf`'s output changed over the running change rect.
    ///
    /// The running rect first grows by the leaf's own margin: a changed
    /// filter output dirties a halo around the change. The root leaf is
    /// skipped: its projection is the image itself, and nothing above it
    /// recomposites.
    pub fn register_change_rect(&mut self, leaf: ProjectionLeaf<'_>, position: NodePosition) {
        if leaf.is_root() {
            return;
        }
        self.change_rect = inflated(self.change_rect, leaf.margin());
        if let Some(rect) = clamped_nonempty(self.change_rect, self.crop_rect) {
            tracing::trace!(leaf = leaf.id().0, ?rect, ?position, "register change rect");
            self.registrations.push(Registration {
                leaf: leaf.id(),
                rect,
                position,
                role: RectRole::Change,
            });
        }
    }

    /// Record that `leaf` needs the running change rect, grown by its own
    /// margin, as input before it can recompute.
    ///
    /// The margin is applied on top of the running rect without feeding back
    /// into it: a need rect is an input requirement, not propagated dirt.
    pub fn register_need_rect(&mut self, leaf: ProjectionLeaf<'_>, position: NodePosition) {
        let need = inflated(self.change_rect, leaf.margin());
        if let Some(rect) = clamped_nonempty(need, self.crop_rect) {
            tracing::trace!(leaf = leaf.id().0, ?rect, ?position, "register need rect");
            self.registrations.push(Registration {
                leaf: leaf.id(),
                rect,
                position,
                role: RectRole::Need,
            });
        }
    }

    /// Grow the running change rect per mask-type semantics: the filthy mask
    /// and every mask applied after it widen the dirty region of the owning
    /// layer's projection.
    pub(crate) fn adjust_masks_change_rect(&mut self, filthy_mask: ProjectionLeaf<'_>) {
        debug_assert!(filthy_mask.is_mask());
        self.change_rect = inflated(self.change_rect, filthy_mask.margin());
        let mut next = filthy_mask.next_sibling();
        while let Some(mask) = next {
            self.change_rect = inflated(self.change_rect, mask.margin());
            next = mask.next_sibling();
        }
    }

    /// The full ordered annotation sequence accumulated so far.
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Change-rect registrations, in sequence order.
    pub fn change_rects(&self) -> impl Iterator<Item = &Registration> {
        self.registrations
            .iter()
            .filter(|r| r.role == RectRole::Change)
    }

    /// Need-rect registrations, in sequence order.
    pub fn need_rects(&self) -> impl Iterator<Item = &Registration> {
        self.registrations
            .iter()
            .filter(|r| r.role == RectRole::Need)
    }

    /// Consume the walker, handing the plan to the job scheduler.
    pub fn into_registrations(self) -> Vec<Registration> {
        self.registrations
    }
}

#[cfg(test)]
#[path = "../../tests/unit/walk/rects.rs"]
mod tests;
