pub mod cluster;
pub mod ops;
pub mod traversal;

use crate::libs::supertree::label::{LabelId, LabelTable};
use crate::libs::supertree::node::{Node, NodeId};
use fixedbitset::FixedBitSet;
use std::collections::BTreeSet;

/// A rooted, leaf-labeled source (or pruned) tree (spec §4.A "Tree store").
///
/// Mirrors the arena-of-indices layout used throughout this crate's
/// graph types: nodes live in a flat `Vec`, are soft-deleted, and are
/// only physically reclaimed by `compact`.
#[derive(Debug, Default, Clone)]
pub struct Tree {
    pub(super) nodes: Vec<Node>,
    pub(super) root: Option<NodeId>,
    /// Tree weight w(t) from spec §3 ("Supertree under construction").
    /// Defaults to 1; set from a `[&W <number>]` annotation when `-w`
    /// is given.
    pub weight: u32,
    /// Per-node leaf-number cluster, indexed by `NodeId`. `None` until
    /// `build_leaf_clusters` runs.
    pub(super) leaf_clusters: Vec<Option<FixedBitSet>>,
    /// Per-node label-number cluster, indexed by `NodeId`. `None` until
    /// `build_label_clusters` runs. A `BTreeSet` rather than a bitset
    /// since the global label table keeps growing as later trees are
    /// interned, so no fixed width can be chosen up front.
    pub(super) label_clusters: Vec<Option<BTreeSet<LabelId>>>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            weight: 1,
            ..Default::default()
        }
    }

    pub fn add_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id));
        self.leaf_clusters.push(None);
        self.label_clusters.push(None);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| !n.deleted).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        if self.get_node(id).is_some() {
            self.root = Some(id);
        }
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).filter(|n| !n.deleted)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id).filter(|n| !n.deleted)
    }

    // --- Delegation to ops ---

    pub fn add_child(&mut self, parent_id: NodeId, child_id: NodeId) -> Result<(), String> {
        ops::add_child(self, parent_id, child_id)
    }

    /// Unlink a leaf; if its parent becomes unary, suppress the parent
    /// and rewire the grandparent (spec §4.A "remove-leaf").
    pub fn remove_leaf(&mut self, id: NodeId) {
        ops::remove_leaf(self, id)
    }

    /// Recompute leaf-number, weight, degree and leaf ordering
    /// (spec §4.A "update").
    pub fn update(&mut self) {
        ops::update(self)
    }

    pub fn compact(&mut self) {
        ops::compact(self)
    }

    // --- Delegation to traversal ---

    pub fn preorder(&self, start: NodeId) -> Vec<NodeId> {
        traversal::preorder(self, start)
    }

    pub fn postorder(&self, start: NodeId) -> Vec<NodeId> {
        traversal::postorder(self, start)
    }

    /// Deep copy of the subtree rooted at `start`, with fresh node
    /// identity (spec §4.A "copy-subtree").
    pub fn copy_subtree(&self, start: NodeId) -> Tree {
        traversal::copy_subtree(self, start)
    }

    pub fn get_leaves(&self) -> Vec<NodeId> {
        match self.root {
            Some(r) => traversal::preorder(self, r)
                .into_iter()
                .filter(|&id| self.nodes[id].is_leaf())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn leaf_names(&self) -> Vec<String> {
        self.get_leaves()
            .into_iter()
            .filter_map(|id| self.nodes[id].name.clone())
            .collect()
    }

    // --- Delegation to cluster ---

    /// Post-order traversal populating each internal node's leaf-number
    /// cluster as the union of its children's clusters; leaves seed the
    /// union with their own 0-based leaf order (spec §4.A).
    pub fn build_leaf_clusters(&mut self) {
        cluster::build_leaf_clusters(self)
    }

    /// Same as `build_leaf_clusters` but indexed by the shared global
    /// `LabelTable`, interning any new leaf label encountered.
    pub fn build_label_clusters(&mut self, labels: &mut LabelTable) {
        cluster::build_label_clusters(self, labels)
    }

    /// Same as `build_label_clusters`, but looks labels up in `labels`
    /// instead of interning them — used on pruned copies whose leaf
    /// names are already all known to the shared table.
    pub fn build_label_clusters_readonly(&mut self, labels: &LabelTable) {
        cluster::build_label_clusters_readonly(self, labels)
    }

    pub fn label_cluster(&self, id: NodeId) -> Option<&BTreeSet<LabelId>> {
        self.label_clusters.get(id).and_then(|c| c.as_ref())
    }

    pub fn leaf_cluster(&self, id: NodeId) -> Option<&FixedBitSet> {
        self.leaf_clusters.get(id).and_then(|c| c.as_ref())
    }

    /// The `LabelId`s of this tree's own leaves, in leaf order. Requires
    /// `build_label_clusters` to have run.
    pub fn leaf_label_ids(&self, labels: &LabelTable) -> Vec<LabelId> {
        self.get_leaves()
            .into_iter()
            .filter_map(|id| {
                self.nodes[id]
                    .name
                    .as_deref()
                    .and_then(|n| labels.get(n))
            })
            .collect()
    }
}
