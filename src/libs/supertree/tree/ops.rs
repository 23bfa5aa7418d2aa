use super::{traversal, Tree};
use crate::libs::supertree::node::NodeId;

pub fn add_child(tree: &mut Tree, parent_id: NodeId, child_id: NodeId) -> Result<(), String> {
    if parent_id == child_id {
        return Err("cannot add a node as its own child".to_string());
    }
    if tree.get_node(parent_id).is_none() {
        return Err(format!("parent node {} not found or deleted", parent_id));
    }
    if tree.get_node(child_id).is_none() {
        return Err(format!("child node {} not found or deleted", child_id));
    }
    if let Some(old_parent) = tree.nodes[child_id].parent {
        return Err(format!(
            "node {} already has parent {}",
            child_id, old_parent
        ));
    }

    tree.nodes[child_id].parent = Some(parent_id);
    tree.nodes[parent_id].children.push(child_id);
    Ok(())
}

fn mark_deleted(tree: &mut Tree, id: NodeId) {
    if let Some(node) = tree.nodes.get_mut(id) {
        node.deleted = true;
        node.children.clear();
        node.parent = None;
    }
    if tree.root == Some(id) {
        tree.root = None;
    }
}

/// Restore the "every internal node has >=1 child" invariant above `id`
/// after one of its children was removed: a node left with zero
/// children is itself removed and the check repeats on its parent; a
/// node left with exactly one child is spliced out, its child inheriting
/// the combined edge length, and the check stops.
fn suppress_upward(tree: &mut Tree, id: NodeId) {
    let (children, parent) = match tree.get_node(id) {
        Some(n) => (n.children.clone(), n.parent),
        None => return,
    };

    match children.len() {
        0 => {
            if let Some(pid) = parent {
                if let Some(p) = tree.get_node_mut(pid) {
                    p.children.retain(|&c| c != id);
                }
            }
            mark_deleted(tree, id);
            if let Some(pid) = parent {
                suppress_upward(tree, pid);
            }
        }
        1 => {
            let only_child = children[0];
            let combined = match (tree.nodes[id].length, tree.nodes[only_child].length) {
                (Some(a), Some(b)) => Some(a + b),
                (Some(a), None) | (None, Some(a)) => Some(a),
                (None, None) => None,
            };
            match parent {
                Some(pid) => {
                    if let Some(p) = tree.get_node_mut(pid) {
                        if let Some(pos) = p.children.iter().position(|&c| c == id) {
                            p.children[pos] = only_child;
                        }
                    }
                    if let Some(c) = tree.get_node_mut(only_child) {
                        c.parent = Some(pid);
                        c.length = combined;
                    }
                    mark_deleted(tree, id);
                }
                None => {
                    if let Some(c) = tree.get_node_mut(only_child) {
                        c.parent = None;
                        c.length = None;
                    }
                    mark_deleted(tree, id);
                    tree.root = Some(only_child);
                }
            }
        }
        _ => {}
    }
}

/// spec §4.A "remove-leaf": unlink a leaf; if its parent becomes unary,
/// suppress the parent and rewire the grandparent.
pub fn remove_leaf(tree: &mut Tree, id: NodeId) {
    let parent = match tree.get_node(id) {
        Some(n) if n.is_leaf() => n.parent,
        _ => return,
    };

    if let Some(pid) = parent {
        if let Some(p) = tree.get_node_mut(pid) {
            p.children.retain(|&c| c != id);
        }
    }
    mark_deleted(tree, id);

    if let Some(pid) = parent {
        suppress_upward(tree, pid);
    }
}

/// spec §4.A "update": recompute leaf-number, weight, and leaf ordering.
/// Degree is never cached; it is always `node.children.len()`.
pub fn update(tree: &mut Tree) {
    let root = match tree.root {
        Some(r) => r,
        None => return,
    };

    for id in traversal::postorder(tree, root) {
        let weight = if tree.nodes[id].is_leaf() {
            1
        } else {
            tree.nodes[id]
                .children
                .iter()
                .map(|&c| tree.nodes[c].weight)
                .sum()
        };
        tree.nodes[id].weight = weight;
    }

    let mut next_leaf_number = 0usize;
    for id in traversal::preorder(tree, root) {
        if tree.nodes[id].is_leaf() {
            tree.nodes[id].leaf_number = Some(next_leaf_number);
            next_leaf_number += 1;
        } else {
            tree.nodes[id].leaf_number = None;
        }
    }
}

/// Remove soft-deleted nodes and remap ids. Invalidates every `NodeId`
/// held outside the tree, and the leaf/label cluster caches (callers
/// must rebuild them after compacting).
pub fn compact(tree: &mut Tree) {
    let mut old_to_new = std::collections::HashMap::new();
    let mut new_nodes = Vec::with_capacity(tree.nodes.len());
    let mut new_idx = 0;

    for old_node in &tree.nodes {
        if !old_node.deleted {
            old_to_new.insert(old_node.id, new_idx);
            let mut new_node = old_node.clone();
            new_node.id = new_idx;
            new_node.parent = None;
            new_node.children.clear();
            new_nodes.push(new_node);
            new_idx += 1;
        }
    }

    for (old_idx, node) in tree.nodes.iter().enumerate() {
        if node.deleted {
            continue;
        }
        let new_self_idx = *old_to_new.get(&old_idx).unwrap();

        if let Some(old_parent) = node.parent {
            if let Some(&new_parent) = old_to_new.get(&old_parent) {
                new_nodes[new_self_idx].parent = Some(new_parent);
            }
        }
        for &old_child in &node.children {
            if let Some(&new_child) = old_to_new.get(&old_child) {
                new_nodes[new_self_idx].children.push(new_child);
            }
        }
    }

    if let Some(old_root) = tree.root {
        tree.root = old_to_new.get(&old_root).copied();
    }

    tree.nodes = new_nodes;
    tree.leaf_clusters = vec![None; tree.nodes.len()];
    tree.label_clusters = vec![None; tree.nodes.len()];
}
