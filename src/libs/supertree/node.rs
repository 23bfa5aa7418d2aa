/// NodeId is an index into a Tree's node arena.
pub type NodeId = usize;

/// A node of a rooted, leaf-labeled tree (spec §3 "Tree (rooted)").
///
/// Weight and leaf-number are derived fields, recomputed by
/// [`crate::libs::supertree::tree::Tree::update`] after any structural
/// mutation; they are not kept in sync automatically by `add_child`/
/// `remove_leaf` so that a caller performing several mutations in a row
/// pays the O(n) recompute only once.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,

    /// Leaf label; mandatory for leaves, optional (support value or
    /// internal name) for internals.
    pub name: Option<String>,
    /// Edge length to `parent`.
    pub length: Option<f64>,
    /// Stable order among leaves, assigned by `update`. `None` for
    /// internal nodes.
    pub leaf_number: Option<usize>,
    /// Number of leaves in this node's subtree.
    pub weight: usize,

    pub deleted: bool,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            name: None,
            length: None,
            leaf_number: None,
            weight: 0,
            deleted: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Child count, i.e. the node's degree (spec §3: "a degree equal to
    /// its child count").
    pub fn degree(&self) -> usize {
        self.children.len()
    }

    /// A "fan" node per the Glossary: an internal node with more than
    /// two children.
    pub fn is_fan(&self) -> bool {
        self.children.len() > 2
    }
}
