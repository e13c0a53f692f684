use super::*;
use crate::walk::rects::RectRole;

fn crop() -> Rect {
    Rect::new(0.0, 0.0, 100.0, 100.0)
}

fn walk(tree: &ProjectionTree, start: LeafId) -> MergeWalker {
    let mut walker = MergeWalker::new(crop(), WalkFlags::Default);
    walker.start_trip(tree, start);
    walker
}

fn change(leaf: LeafId, position: NodePosition) -> Registration {
    Registration {
        leaf,
        rect: crop(),
        position,
        role: RectRole::Change,
    }
}

fn need(leaf: LeafId, position: NodePosition) -> Registration {
    Registration {
        leaf,
        rect: crop(),
        position,
        role: RectRole::Need,
    }
}

const ABOVE: NodePosition = NodePosition::ABOVE_FILTHY;
const BELOW: NodePosition = NodePosition::BELOW_FILTHY;
const FILTHY: NodePosition = NodePosition::FILTHY;
const TOP: NodePosition = NodePosition::TOPMOST;
const BOTTOM: NodePosition = NodePosition::BOTTOMMOST;

// Scenario: root -> [a, b, c] bottom to top, b is filthy.
#[test]
fn filthy_middle_layer_produces_the_expected_sequence() {
    let mut tree = ProjectionTree::new();
    let a = tree.add_layer(tree.root(), "a").unwrap();
    let b = tree.add_layer(tree.root(), "b").unwrap();
    let c = tree.add_layer(tree.root(), "c").unwrap();

    let walker = walk(&tree, b);
    assert_eq!(walker.update_type(), UpdateType::Update);
    assert_eq!(
        walker.registrations(),
        vec![
            change(b, FILTHY),
            change(c, ABOVE.union(TOP)),
            need(tree.root(), FILTHY.union(TOP).union(BOTTOM)),
            need(c, ABOVE.union(TOP)),
            need(b, FILTHY),
            need(a, BELOW.union(BOTTOM)),
        ]
        .as_slice()
    );
}

// Scenario: same stack, but the filthy node is a mask on b. b must regenerate
// its projection (need only) while its paint content stays untouched.
#[test]
fn filthy_mask_registers_owner_as_projection_regenerate() {
    let mut tree = ProjectionTree::new();
    let a = tree.add_layer(tree.root(), "a").unwrap();
    let b = tree.add_layer(tree.root(), "b").unwrap();
    let mask = tree.add_mask(b, "m", 0.0).unwrap();
    let c = tree.add_layer(tree.root(), "c").unwrap();

    let walker = walk(&tree, mask);
    assert_eq!(
        walker.registrations(),
        vec![
            change(c, ABOVE.union(TOP)),
            need(tree.root(), FILTHY.union(TOP).union(BOTTOM)),
            need(c, ABOVE.union(TOP)),
            need(b, NodePosition::FILTHY_PROJECTION),
            need(a, BELOW.union(BOTTOM)),
        ]
        .as_slice()
    );
    assert!(walker.change_rects().all(|r| r.leaf != b));
    assert!(walker.registrations().iter().all(|r| r.leaf != mask));
}

// Scenario: root -> [a, g[x, y]], x is filthy. The group recomposites, its
// upper child is above the change, and a is read through at the root level.
#[test]
fn nested_group_propagates_through_the_parent_trip() {
    let mut tree = ProjectionTree::new();
    let a = tree.add_layer(tree.root(), "a").unwrap();
    let g = tree.add_group(tree.root(), "g").unwrap();
    let x = tree.add_layer(g, "x").unwrap();
    let y = tree.add_layer(g, "y").unwrap();

    let walker = walk(&tree, x);
    assert_eq!(
        walker.registrations(),
        vec![
            change(x, FILTHY.union(BOTTOM)),
            change(y, ABOVE.union(TOP)),
            change(g, FILTHY.union(TOP)),
            need(tree.root(), FILTHY.union(TOP).union(BOTTOM)),
            need(g, FILTHY.union(TOP)),
            need(a, BELOW.union(BOTTOM)),
            need(y, ABOVE.union(TOP)),
            need(x, FILTHY.union(BOTTOM)),
        ]
        .as_slice()
    );
}

#[test]
fn degenerate_crop_walks_to_completion_with_an_empty_plan() {
    let mut tree = ProjectionTree::new();
    let _a = tree.add_layer(tree.root(), "a").unwrap();
    let b = tree.add_layer(tree.root(), "b").unwrap();

    let mut walker = MergeWalker::new(Rect::new(10.0, 10.0, 10.0, 50.0), WalkFlags::Default);
    walker.start_trip(&tree, b);
    assert!(walker.registrations().is_empty());
}

// Scenario: no-filthy walk from a layer. The origin is tagged as if it sat
// above the change; the rest of the chain proceeds as in the default walk.
#[test]
fn no_filthy_walk_downgrades_the_origin_flag() {
    let mut tree = ProjectionTree::new();
    let a = tree.add_layer(tree.root(), "a").unwrap();
    let b = tree.add_layer(tree.root(), "b").unwrap();
    let c = tree.add_layer(tree.root(), "c").unwrap();

    let mut walker = MergeWalker::new(crop(), WalkFlags::NoFilthyMode);
    walker.start_trip(&tree, b);
    assert_eq!(walker.update_type(), UpdateType::UpdateNoFilthy);
    assert_eq!(
        walker.registrations(),
        vec![
            change(b, ABOVE),
            change(c, ABOVE.union(TOP)),
            need(tree.root(), ABOVE.union(TOP).union(BOTTOM)),
            need(c, ABOVE.union(TOP)),
            need(b, ABOVE),
            need(a, BELOW.union(BOTTOM)),
        ]
        .as_slice()
    );
}

#[test]
fn no_filthy_mask_walk_downgrades_the_owner_flag() {
    let mut tree = ProjectionTree::new();
    let b = tree.add_layer(tree.root(), "b").unwrap();
    let mask = tree.add_mask(b, "m", 0.0).unwrap();

    let mut walker = MergeWalker::new(crop(), WalkFlags::NoFilthyMode);
    walker.start_trip(&tree, mask);
    let owner_need = walker
        .need_rects()
        .find(|r| r.leaf == b)
        .expect("owner must be registered");
    assert_eq!(owner_need.position.relationship(), ABOVE);
}

// Minimality: an unrelated group's children are never visited, only the
// group itself as a sibling above the filthy leaf's ancestor.
#[test]
fn unrelated_subtrees_receive_no_registrations() {
    let mut tree = ProjectionTree::new();
    let a = tree.add_layer(tree.root(), "a").unwrap();
    let g1 = tree.add_group(tree.root(), "g1").unwrap();
    let p = tree.add_layer(g1, "p").unwrap();
    let q = tree.add_layer(g1, "q").unwrap();
    let g2 = tree.add_group(tree.root(), "g2").unwrap();
    let r = tree.add_layer(g2, "r").unwrap();
    let s = tree.add_layer(g2, "s").unwrap();

    let walker = walk(&tree, p);
    let touched: Vec<LeafId> = walker.registrations().iter().map(|reg| reg.leaf).collect();
    assert!(touched.contains(&q));
    assert!(touched.contains(&g1));
    assert!(touched.contains(&g2));
    assert!(touched.contains(&a));
    assert!(!touched.contains(&r));
    assert!(!touched.contains(&s));

    // g2 sits above the change as a whole: change + need, like any sibling
    // above, but its children are never descended into.
    let g2_regs: Vec<_> = walker
        .registrations()
        .iter()
        .filter(|reg| reg.leaf == g2)
        .collect();
    assert_eq!(g2_regs.len(), 2);
    assert!(g2_regs.iter().all(|r| r.position.relationship() == ABOVE));
}

#[test]
fn each_leaf_registers_at_most_once_per_role() {
    let mut tree = ProjectionTree::new();
    let _a = tree.add_layer(tree.root(), "a").unwrap();
    let g = tree.add_group(tree.root(), "g").unwrap();
    let x = tree.add_layer(g, "x").unwrap();
    let _y = tree.add_layer(g, "y").unwrap();
    let _c = tree.add_layer(tree.root(), "c").unwrap();

    let walker = walk(&tree, x);
    for role in [RectRole::Change, RectRole::Need] {
        let mut seen = std::collections::HashSet::new();
        for reg in walker.registrations().iter().filter(|r| r.role == role) {
            assert!(seen.insert(reg.leaf), "duplicate {role:?} for {:?}", reg.leaf);
        }
    }
}

// Visibility is a compositing concern, not a planning one: hidden lower
// siblings register exactly like visible ones.
#[test]
fn lower_siblings_register_regardless_of_visibility() {
    let mut tree = ProjectionTree::new();
    let a = tree.add_layer(tree.root(), "a").unwrap();
    let b = tree.add_layer(tree.root(), "b").unwrap();
    let c = tree.add_layer(tree.root(), "c").unwrap();
    tree.set_visible(b, false);

    let walker = walk(&tree, c);
    let b_reg = walker
        .need_rects()
        .find(|reg| reg.leaf == b)
        .expect("hidden lower sibling must still be planned");
    assert_eq!(b_reg.position.relationship(), BELOW);
    assert!(walker.need_rects().any(|reg| reg.leaf == a));
    assert!(walker.change_rects().all(|reg| reg.leaf != b));
}

// A changed mask with a margin widens the region every affected node sees.
#[test]
fn mask_margin_widens_the_propagated_rects() {
    let mut tree = ProjectionTree::new();
    let _a = tree.add_layer(tree.root(), "a").unwrap();
    let b = tree.add_layer(tree.root(), "b").unwrap();
    let mask = tree.add_mask(b, "m", 3.0).unwrap();
    let c = tree.add_layer(tree.root(), "c").unwrap();

    let mut walker =
        MergeWalker::new(crop(), WalkFlags::Default).with_requested_rect(Rect::new(40.0, 40.0, 60.0, 60.0));
    walker.start_trip(&tree, mask);

    let c_change = walker.change_rects().find(|r| r.leaf == c).unwrap();
    assert_eq!(c_change.rect, Rect::new(37.0, 37.0, 63.0, 63.0));
    let b_need = walker.need_rects().find(|r| r.leaf == b).unwrap();
    assert_eq!(b_need.rect, Rect::new(37.0, 37.0, 63.0, 63.0));
}

// A filter layer above the change both dirties a halo (change) and reads an
// even wider halo (need).
#[test]
fn filter_layers_grow_change_and_need_rects() {
    let mut tree = ProjectionTree::new();
    let a = tree.add_layer(tree.root(), "a").unwrap();
    let f = tree.add_filter(tree.root(), "f", 2.0).unwrap();

    let mut walker = MergeWalker::new(crop(), WalkFlags::Default)
        .with_requested_rect(Rect::new(40.0, 40.0, 60.0, 60.0));
    walker.start_trip(&tree, a);

    let f_change = walker.change_rects().find(|r| r.leaf == f).unwrap();
    assert_eq!(f_change.rect, Rect::new(38.0, 38.0, 62.0, 62.0));
    let f_need = walker.need_rects().find(|r| r.leaf == f).unwrap();
    assert_eq!(f_need.rect, Rect::new(36.0, 36.0, 64.0, 64.0));
    let a_change = walker.change_rects().find(|r| r.leaf == a).unwrap();
    assert_eq!(a_change.rect, Rect::new(40.0, 40.0, 60.0, 60.0));
}

#[test]
fn filthy_root_still_registers_its_own_need() {
    let tree = ProjectionTree::new();
    let walker = walk(&tree, tree.root());
    assert_eq!(walker.change_rects().count(), 0);
    assert_eq!(walker.need_rects().count(), 1);
}

// The walk is instrumented; make sure the spans and per-registration trace
// events actually fire under a subscriber.
#[test]
fn trip_emits_trace_events_under_a_subscriber() {
    let mut tree = ProjectionTree::new();
    let _a = tree.add_layer(tree.root(), "a").unwrap();
    let b = tree.add_layer(tree.root(), "b").unwrap();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        let walker = walk(&tree, b);
        // change b, need root, need b, need a
        assert_eq!(walker.registrations().len(), 4);
    });
}

#[test]
fn registrations_serialize_for_plan_snapshots() {
    let mut tree = ProjectionTree::new();
    let _a = tree.add_layer(tree.root(), "a").unwrap();
    let b = tree.add_layer(tree.root(), "b").unwrap();

    let walker = walk(&tree, b);
    let value = serde_json::to_value(walker.registrations()).unwrap();
    let regs = value.as_array().unwrap();
    assert_eq!(regs.len(), walker.registrations().len());
    assert_eq!(regs[0]["role"], "Change");
    assert_eq!(regs[0]["leaf"], b.0);
}
