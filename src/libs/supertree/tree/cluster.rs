use super::{traversal, Tree};
use crate::libs::supertree::label::{LabelId, LabelTable};
use fixedbitset::FixedBitSet;
use std::collections::BTreeSet;

/// spec §4.A "build-leaf-clusters": post-order traversal populating each
/// internal node's cluster as the union of its children's clusters;
/// leaves seed the union with their own 0-based position among this
/// tree's leaves (leaf-number cluster, indices 1..n for an n-leaf tree).
pub fn build_leaf_clusters(tree: &mut Tree) {
    let root = match tree.root {
        Some(r) => r,
        None => return,
    };

    let order = traversal::preorder(tree, root);
    let n = order.iter().filter(|&&id| tree.nodes[id].is_leaf()).count();

    let mut next = 0usize;
    let mut leaf_index = std::collections::HashMap::new();
    for &id in &order {
        if tree.nodes[id].is_leaf() {
            leaf_index.insert(id, next);
            next += 1;
        }
    }

    for id in traversal::postorder(tree, root) {
        let set = if tree.nodes[id].is_leaf() {
            let mut bs = FixedBitSet::with_capacity(n);
            bs.insert(leaf_index[&id]);
            bs
        } else {
            let mut bs = FixedBitSet::with_capacity(n);
            for &child in &tree.nodes[id].children {
                if let Some(Some(child_set)) = tree.leaf_clusters.get(child) {
                    bs.union_with(child_set);
                }
            }
            bs
        };
        tree.leaf_clusters[id] = Some(set);
    }
}

/// Same traversal as `build_label_clusters`, but looks labels up instead
/// of interning them. Used when rebuilding clusters on a pruned copy of
/// a tree whose leaf names are already all known to the shared table.
pub fn build_label_clusters_readonly(tree: &mut Tree, labels: &LabelTable) {
    let root = match tree.root {
        Some(r) => r,
        None => return,
    };

    let mut leaf_label = std::collections::HashMap::new();
    for id in traversal::preorder(tree, root) {
        if tree.nodes[id].is_leaf() {
            if let Some(name) = tree.nodes[id].name.as_deref() {
                if let Some(label) = labels.get(name) {
                    leaf_label.insert(id, label);
                }
            }
        }
    }

    for id in traversal::postorder(tree, root) {
        let set: BTreeSet<LabelId> = if tree.nodes[id].is_leaf() {
            leaf_label.get(&id).copied().into_iter().collect()
        } else {
            let mut set = BTreeSet::new();
            for &child in &tree.nodes[id].children {
                if let Some(Some(child_set)) = tree.label_clusters.get(child) {
                    set.extend(child_set.iter().copied());
                }
            }
            set
        };
        tree.label_clusters[id] = Some(set);
    }
}

/// spec §4.A "build-label-clusters": same shape as `build_leaf_clusters`
/// but indexed by the shared global label table, interning any new leaf
/// label encountered.
pub fn build_label_clusters(tree: &mut Tree, labels: &mut LabelTable) {
    let root = match tree.root {
        Some(r) => r,
        None => return,
    };

    let mut leaf_label = std::collections::HashMap::new();
    for id in traversal::preorder(tree, root) {
        if tree.nodes[id].is_leaf() {
            let name = tree.nodes[id]
                .name
                .clone()
                .unwrap_or_else(|| format!("__unnamed_leaf_{}", id));
            leaf_label.insert(id, labels.intern(&name));
        }
    }

    for id in traversal::postorder(tree, root) {
        let set: BTreeSet<LabelId> = if tree.nodes[id].is_leaf() {
            std::iter::once(leaf_label[&id]).collect()
        } else {
            let mut set = BTreeSet::new();
            for &child in &tree.nodes[id].children {
                if let Some(Some(child_set)) = tree.label_clusters.get(child) {
                    set.extend(child_set.iter().copied());
                }
            }
            set
        };
        tree.label_clusters[id] = Some(set);
    }
}
