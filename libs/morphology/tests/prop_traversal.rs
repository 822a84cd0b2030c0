use glam::DVec3;
use morphology::{
    preorder_forest, Compartment, CompartmentId, CompartmentTree, CompartmentType, NO_PARENT,
};
use proptest::prelude::*;
use std::collections::HashMap;

// Each node i > 0 either starts a new root or attaches to an earlier node,
// which always yields a forest.
fn arb_forest() -> impl Strategy<Value = CompartmentTree> {
    prop::collection::vec(prop::option::weighted(0.9, any::<prop::sample::Index>()), 1..200)
        .prop_map(|links| {
            let nodes = links.iter().enumerate().map(|(i, link)| {
                let parent = match link {
                    Some(idx) if i > 0 => idx.index(i) as CompartmentId,
                    _ => NO_PARENT,
                };
                Compartment::new(
                    i as CompartmentId,
                    CompartmentType::BASAL_DENDRITE,
                    DVec3::new(i as f64, 0.0, 0.0),
                    1.0,
                    parent,
                )
            });
            CompartmentTree::from_compartments(nodes.collect::<Vec<_>>())
                .expect("generated ids are unique")
        })
}

proptest! {
    // Every compartment reachable from a root is visited exactly once.
    #[test]
    fn forest_visits_each_node_once(tree in arb_forest()) {
        let order = preorder_forest(&tree).unwrap();
        prop_assert_eq!(order.len(), tree.len());
        let mut seen = HashMap::new();
        for c in &order {
            *seen.entry(c.id).or_insert(0) += 1;
        }
        prop_assert!(seen.values().all(|&n| n == 1));
    }

    // Pre-order: a node always comes after its parent.
    #[test]
    fn parent_precedes_child(tree in arb_forest()) {
        let order = preorder_forest(&tree).unwrap();
        let position: HashMap<CompartmentId, usize> =
            order.iter().enumerate().map(|(i, c)| (c.id, i)).collect();
        for c in &order {
            if !c.is_root() {
                prop_assert!(position[&c.parent] < position[&c.id]);
            }
        }
    }

    // Traversal does not depend on any state outside the tree.
    #[test]
    fn traversal_is_repeatable(tree in arb_forest()) {
        let a: Vec<_> = preorder_forest(&tree).unwrap().iter().map(|c| c.id).collect();
        let b: Vec<_> = preorder_forest(&tree).unwrap().iter().map(|c| c.id).collect();
        prop_assert_eq!(a, b);
    }
}
