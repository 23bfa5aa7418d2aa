use crate::libs::supertree::label::{LabelId, LabelTable};
use crate::libs::supertree::tree::Tree;
use std::collections::BTreeSet;

/// `T|V` (spec §4.G): a tree restricted to a leaf-label subset, via a
/// deep copy with every leaf outside `v` unlinked and unary chains
/// suppressed (`Tree::remove_leaf` does the suppression). `None` if
/// fewer than two of the tree's leaves survive — such a tree carries no
/// information about how `v`'s members relate to one another.
pub fn restrict(tree: &Tree, labels: &LabelTable, v: &BTreeSet<LabelId>) -> Option<Tree> {
    let root = tree.get_root()?;
    let mut copy = tree.copy_subtree(root);

    let to_remove: Vec<_> = copy
        .get_leaves()
        .into_iter()
        .filter(|&id| {
            let keep = copy
                .get_node(id)
                .and_then(|n| n.name.as_deref())
                .and_then(|name| labels.get(name))
                .is_some_and(|label| v.contains(&label));
            !keep
        })
        .collect();

    for id in to_remove {
        copy.remove_leaf(id);
    }

    if copy.get_root().is_none() || copy.get_leaves().len() < 2 {
        return None;
    }

    copy.compact();
    copy.update();
    copy.build_label_clusters_readonly(labels);
    Some(copy)
}

/// `restrict` applied to every tree in `trees`, dropping the ones that
/// carry no information about `v`.
pub fn restrict_all(trees: &[Tree], labels: &LabelTable, v: &BTreeSet<LabelId>) -> Vec<Tree> {
    trees.iter().filter_map(|t| restrict(t, labels, v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::supertree::node::Node;

    fn quartet(labels: &mut LabelTable) -> Tree {
        let mut t = Tree::new();
        let root = t.add_node();
        let ab = t.add_node();
        let cd = t.add_node();
        let a = t.add_node();
        let b = t.add_node();
        let c = t.add_node();
        let d = t.add_node();
        *t.get_node_mut(a).unwrap() = Node::new(a).with_name("A");
        *t.get_node_mut(b).unwrap() = Node::new(b).with_name("B");
        *t.get_node_mut(c).unwrap() = Node::new(c).with_name("C");
        *t.get_node_mut(d).unwrap() = Node::new(d).with_name("D");
        t.add_child(ab, a).unwrap();
        t.add_child(ab, b).unwrap();
        t.add_child(cd, c).unwrap();
        t.add_child(cd, d).unwrap();
        t.add_child(root, ab).unwrap();
        t.add_child(root, cd).unwrap();
        t.set_root(root);
        t.update();
        t.build_label_clusters(labels);
        t
    }

    #[test]
    fn restricting_to_one_clade_drops_the_rest() {
        let mut labels = LabelTable::new();
        let t = quartet(&mut labels);
        let a = labels.get("A").unwrap();
        let b = labels.get("B").unwrap();
        let v: BTreeSet<LabelId> = [a, b].into_iter().collect();
        let restricted = restrict(&t, &labels, &v).unwrap();
        assert_eq!(restricted.leaf_names().len(), 2);
    }

    #[test]
    fn restricting_to_a_single_leaf_yields_none() {
        let mut labels = LabelTable::new();
        let t = quartet(&mut labels);
        let a = labels.get("A").unwrap();
        let v: BTreeSet<LabelId> = [a].into_iter().collect();
        assert!(restrict(&t, &labels, &v).is_none());
    }

    #[test]
    fn restricting_to_one_leaf_per_clade_keeps_both() {
        let mut labels = LabelTable::new();
        let t = quartet(&mut labels);
        let a = labels.get("A").unwrap();
        let c = labels.get("C").unwrap();
        let v: BTreeSet<LabelId> = [a, c].into_iter().collect();
        let restricted = restrict(&t, &labels, &v).unwrap();
        assert_eq!(restricted.leaf_names().len(), 2);
    }
}
