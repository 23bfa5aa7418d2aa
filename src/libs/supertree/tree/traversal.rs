use super::Tree;
use crate::libs::supertree::node::NodeId;

/// Iterative preorder, children visited in stable left-to-right order.
pub fn preorder(tree: &Tree, start: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        out.push(id);
        if let Some(node) = tree.get_node(id) {
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
    }
    out
}

fn postorder_rec(tree: &Tree, id: NodeId, out: &mut Vec<NodeId>) {
    if let Some(node) = tree.get_node(id) {
        for &child in &node.children {
            postorder_rec(tree, child, out);
        }
    }
    out.push(id);
}

pub fn postorder(tree: &Tree, start: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    postorder_rec(tree, start, &mut out);
    out
}

/// Deep copy of the subtree rooted at `start`; node identity is fresh
/// (spec §4.A "copy-subtree").
pub fn copy_subtree(tree: &Tree, start: NodeId) -> Tree {
    let mut new_tree = Tree::new();
    new_tree.weight = tree.weight;

    let mut old_to_new = std::collections::HashMap::new();
    for old_id in preorder(tree, start) {
        let new_id = new_tree.add_node();
        old_to_new.insert(old_id, new_id);
        let old_node = tree.get_node(old_id).unwrap();
        let new_node = new_tree.get_node_mut(new_id).unwrap();
        new_node.name = old_node.name.clone();
        new_node.length = if old_id == start {
            None
        } else {
            old_node.length
        };
    }
    for old_id in preorder(tree, start) {
        if let Some(old_parent) = tree.get_node(old_id).unwrap().parent {
            if let Some(&new_parent) = old_to_new.get(&old_parent) {
                let new_id = old_to_new[&old_id];
                new_tree.nodes[new_parent].children.push(new_id);
                new_tree.nodes[new_id].parent = Some(new_parent);
            }
        }
    }
    new_tree.root = Some(old_to_new[&start]);
    new_tree.update();
    new_tree
}
