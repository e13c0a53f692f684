use crate::foundation::error::{LaminaError, LaminaResult};

/// Index of one leaf in a [`ProjectionTree`] arena.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LeafId(pub u32);

/// What kind of node a leaf wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LeafKind {
    /// The image root. Its projection is the final composited image.
    Root,
    /// A group layer recompositing its child layers.
    Group,
    /// An ordinary paint layer.
    Paint,
    /// An adjustment layer: reads the composited content below it and carries
    /// a need-rect margin (neighborhood-dependent processing).
    Filter,
    /// A mask attached to a layer; applied after the layer's own render.
    Mask,
}

#[derive(Clone, Debug)]
struct ProjectionNode {
    kind: LeafKind,
    name: String,
    visible: bool,
    opacity: f64,
    // Externally supplied need-rect enlargement, in device units. The walker
    // treats it as an opaque policy value.
    margin: f64,
    parent: Option<LeafId>,
    first_child: Option<LeafId>,
    last_child: Option<LeafId>,
    prev_sibling: Option<LeafId>,
    next_sibling: Option<LeafId>,
}

/// Arena-backed layer/mask tree.
///
/// The tree is built once through the validated `add_*` methods and then
/// borrowed immutably by walkers. Child lists are ordered bottom-to-top in
/// z-order: `first_child` composites first, `last_child` last. Masks are
/// children of the layer they modify, in application order.
#[derive(Clone, Debug)]
pub struct ProjectionTree {
    nodes: Vec<ProjectionNode>,
}

impl ProjectionTree {
    /// Create a tree holding only the image root.
    pub fn new() -> Self {
        Self {
            nodes: vec![ProjectionNode {
                kind: LeafKind::Root,
                name: "root".to_owned(),
                visible: true,
                opacity: 1.0,
                margin: 0.0,
                parent: None,
                first_child: None,
                last_child: None,
                prev_sibling: None,
                next_sibling: None,
            }],
        }
    }

    /// The root leaf id (always present).
    pub fn root(&self) -> LeafId {
        LeafId(0)
    }

    /// Borrow one leaf. Panics on a stale id (programming error).
    pub fn leaf(&self, id: LeafId) -> ProjectionLeaf<'_> {
        assert!(
            (id.0 as usize) < self.nodes.len(),
            "stale LeafId({}) for a tree of {} leaves",
            id.0,
            self.nodes.len()
        );
        ProjectionLeaf { tree: self, id }
    }

    /// Number of leaves in the tree, root included.
    pub fn leaf_count(&self) -> usize {
        self.nodes.len()
    }

    /// Append a paint layer as the topmost child of `parent`.
    pub fn add_layer(&mut self, parent: LeafId, name: &str) -> LaminaResult<LeafId> {
        self.add_child_layer(parent, name, LeafKind::Paint, 0.0)
    }

    /// Append a group layer as the topmost child of `parent`.
    pub fn add_group(&mut self, parent: LeafId, name: &str) -> LaminaResult<LeafId> {
        self.add_child_layer(parent, name, LeafKind::Group, 0.0)
    }

    /// Append an adjustment layer with a need-rect `margin` as the topmost
    /// child of `parent`.
    pub fn add_filter(&mut self, parent: LeafId, name: &str, margin: f64) -> LaminaResult<LeafId> {
        self.add_child_layer(parent, name, LeafKind::Filter, margin)
    }

    /// Attach a mask to `layer`, applied after any masks already attached.
    ///
    /// Masks attach to paint and filter layers only; their sibling chain is
    /// therefore always homogeneous (all masks), and layer sibling chains
    /// never contain masks.
    pub fn add_mask(&mut self, layer: LeafId, name: &str, margin: f64) -> LaminaResult<LeafId> {
        validate_name(name)?;
        validate_margin(margin)?;
        match self.node(layer).kind {
            LeafKind::Paint | LeafKind::Filter => {}
            other => {
                return Err(LaminaError::validation(format!(
                    "masks attach to paint or filter layers, not {other:?}"
                )));
            }
        }
        Ok(self.attach(layer, LeafKind::Mask, name, margin))
    }

    /// Toggle a leaf's visibility.
    pub fn set_visible(&mut self, id: LeafId, visible: bool) {
        let idx = self.index(id);
        self.nodes[idx].visible = visible;
    }

    /// Set a leaf's opacity in `[0, 1]`.
    pub fn set_opacity(&mut self, id: LeafId, opacity: f64) -> LaminaResult<()> {
        if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
            return Err(LaminaError::validation(
                "opacity must be finite and within [0, 1]",
            ));
        }
        let idx = self.index(id);
        self.nodes[idx].opacity = opacity;
        Ok(())
    }

    fn add_child_layer(
        &mut self,
        parent: LeafId,
        name: &str,
        kind: LeafKind,
        margin: f64,
    ) -> LaminaResult<LeafId> {
        validate_name(name)?;
        validate_margin(margin)?;
        if !self.leaf(parent).can_have_child_layers() {
            return Err(LaminaError::validation(format!(
                "{:?} leaf {name:?} cannot hold child layers",
                self.node(parent).kind
            )));
        }
        Ok(self.attach(parent, kind, name, margin))
    }

    /// Link a new node as the last (topmost) child of `parent`.
    fn attach(&mut self, parent: LeafId, kind: LeafKind, name: &str, margin: f64) -> LeafId {
        let id = LeafId(self.nodes.len() as u32);
        let prev = self.node(parent).last_child;
        self.nodes.push(ProjectionNode {
            kind,
            name: name.to_owned(),
            visible: true,
            opacity: 1.0,
            margin,
            parent: Some(parent),
            first_child: None,
            last_child: None,
            prev_sibling: prev,
            next_sibling: None,
        });

        let parent_idx = self.index(parent);
        if let Some(prev) = prev {
            let prev_idx = self.index(prev);
            self.nodes[prev_idx].next_sibling = Some(id);
        } else {
            self.nodes[parent_idx].first_child = Some(id);
        }
        self.nodes[parent_idx].last_child = Some(id);
        id
    }

    fn node(&self, id: LeafId) -> &ProjectionNode {
        &self.nodes[self.index(id)]
    }

    fn index(&self, id: LeafId) -> usize {
        id.0 as usize
    }
}

impl Default for ProjectionTree {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_name(name: &str) -> LaminaResult<()> {
    if name.trim().is_empty() {
        return Err(LaminaError::validation("leaf name must be non-empty"));
    }
    Ok(())
}

fn validate_margin(margin: f64) -> LaminaResult<()> {
    if !margin.is_finite() || margin < 0.0 {
        return Err(LaminaError::validation(
            "need-rect margin must be finite and >= 0",
        ));
    }
    Ok(())
}

/// Borrowed, read-only view over one leaf of a [`ProjectionTree`].
///
/// This is the navigation surface walkers consume: structural facts only,
/// no pixel data, no mutation.
#[derive(Clone, Copy)]
pub struct ProjectionLeaf<'a> {
    tree: &'a ProjectionTree,
    id: LeafId,
}

impl<'a> ProjectionLeaf<'a> {
    /// The arena id of this leaf.
    pub fn id(&self) -> LeafId {
        self.id
    }

    /// The node kind this leaf wraps.
    pub fn kind(&self) -> LeafKind {
        self.node().kind
    }

    /// Diagnostic name given at construction.
    pub fn name(&self) -> &'a str {
        &self.tree.node(self.id).name
    }

    /// The leaf's parent, if any. Only the root has none.
    pub fn parent(&self) -> Option<ProjectionLeaf<'a>> {
        self.wrap(self.node().parent)
    }

    /// Bottommost child in z-order, if any.
    pub fn first_child(&self) -> Option<ProjectionLeaf<'a>> {
        self.wrap(self.node().first_child)
    }

    /// Topmost child in z-order, if any.
    pub fn last_child(&self) -> Option<ProjectionLeaf<'a>> {
        self.wrap(self.node().last_child)
    }

    /// The sibling composited just below this leaf, if any.
    pub fn prev_sibling(&self) -> Option<ProjectionLeaf<'a>> {
        self.wrap(self.node().prev_sibling)
    }

    /// The sibling composited just above this leaf, if any.
    pub fn next_sibling(&self) -> Option<ProjectionLeaf<'a>> {
        self.wrap(self.node().next_sibling)
    }

    /// True for masks.
    pub fn is_mask(&self) -> bool {
        matches!(self.kind(), LeafKind::Mask)
    }

    /// True for layers, groups included.
    pub fn is_layer(&self) -> bool {
        matches!(self.kind(), LeafKind::Group | LeafKind::Paint | LeafKind::Filter)
    }

    /// True for the image root.
    pub fn is_root(&self) -> bool {
        matches!(self.kind(), LeafKind::Root)
    }

    /// True for leaves that may hold child layers (root and groups).
    pub fn can_have_child_layers(&self) -> bool {
        matches!(self.kind(), LeafKind::Root | LeafKind::Group)
    }

    /// True when recomputing this leaf must read the composited content of
    /// the nodes below it (adjustment layers, read-through blend modes).
    pub fn depends_on_lower_nodes(&self) -> bool {
        matches!(self.kind(), LeafKind::Filter)
    }

    /// Whether the leaf participates in compositing at all.
    pub fn visible(&self) -> bool {
        self.node().visible
    }

    /// Compositing opacity in `[0, 1]`.
    pub fn opacity(&self) -> f64 {
        self.node().opacity
    }

    /// The externally supplied need-rect enlargement for this leaf.
    pub fn margin(&self) -> f64 {
        self.node().margin
    }

    fn node(&self) -> &'a ProjectionNode {
        self.tree.node(self.id)
    }

    fn wrap(&self, id: Option<LeafId>) -> Option<ProjectionLeaf<'a>> {
        id.map(|id| ProjectionLeaf {
            tree: self.tree,
            id,
        })
    }
}

impl std::fmt::Debug for ProjectionLeaf<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionLeaf")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/tree.rs"]
mod tests;
