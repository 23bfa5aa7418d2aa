use crate::libs::supertree::label::LabelId;
use crate::libs::supertree::tree::Tree;
use indexmap::IndexMap;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeColour {
    Uncontradicted,
    Contradicted,
    AdjacentToContradicted,
}

#[derive(Debug, Clone)]
pub struct StNode {
    /// The set of original leaf labels this (possibly merged) node
    /// currently represents.
    pub node_set: BTreeSet<LabelId>,
}

#[derive(Debug, Clone)]
pub struct StEdge {
    pub weight: i64,
    pub freq: i64,
    pub colour: EdgeColour,
}

/// Undirected weighted multigraph over leaf labels (spec §3 "Proper-
/// cluster graph ST", also used unmodified for the CO and fan graphs).
///
/// Backed by `petgraph::graph::UnGraph`, whose node/edge indices stay
/// stable as long as nothing is ever removed via `remove_node`/
/// `remove_edge`. This module never calls either: "deletion" is always
/// a hidden bit (spec §9 "every graph operation takes a generation
/// counter; hidden entries are skipped by iterators"), implemented here
/// as a pair of growable `Vec<bool>` flags, one per node/edge index.
#[derive(Debug, Clone, Default)]
pub struct StGraph {
    pub graph: UnGraph<StNode, StEdge>,
    forward: IndexMap<LabelId, NodeIndex>,
    hidden_nodes: Vec<bool>,
    hidden_edges: Vec<bool>,
}

impl StGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// spec §4.B "add-node": idempotent.
    pub fn add_node(&mut self, label: LabelId) -> NodeIndex {
        if let Some(&idx) = self.forward.get(&label) {
            return idx;
        }
        let mut node_set = BTreeSet::new();
        node_set.insert(label);
        let idx = self.graph.add_node(StNode { node_set });
        self.forward.insert(label, idx);
        self.hidden_nodes.push(false);
        idx
    }

    pub fn node_index(&self, label: LabelId) -> Option<NodeIndex> {
        self.forward.get(&label).copied()
    }

    pub fn node_set(&self, idx: NodeIndex) -> &BTreeSet<LabelId> {
        &self.graph[idx].node_set
    }

    /// spec §4.B "add-edge": self-edges are ignored; a no-op if either
    /// label is absent (add-node was not called for it).
    pub fn add_edge(&mut self, l1: LabelId, l2: LabelId, w: i64) {
        if l1 == l2 {
            return;
        }
        let (a, b) = match (self.forward.get(&l1), self.forward.get(&l2)) {
            (Some(&a), Some(&b)) => (a, b),
            _ => return,
        };
        if let Some(e) = self.graph.find_edge(a, b) {
            let edge = self.graph.edge_weight_mut(e).unwrap();
            edge.weight += w;
            edge.freq += 1;
        } else {
            self.graph
                .add_edge(a, b, StEdge { weight: w, freq: 1, colour: EdgeColour::Uncontradicted });
            self.hidden_edges.push(false);
        }
    }

    /// spec §4.B "merge": `s` absorbs `t`'s node-set; every edge (t,u)
    /// with u != s becomes (s,u), combining weight/frequency on a
    /// collision; any (s,t) edge is dropped; `t` is hidden.
    pub fn merge(&mut self, s_label: LabelId, t_label: LabelId) {
        let s = self.forward[&s_label];
        let t = self.forward[&t_label];
        if s == t {
            return;
        }

        let t_set = self.graph[t].node_set.clone();
        for &lbl in &t_set {
            self.forward.insert(lbl, s);
        }
        self.graph[s].node_set.extend(t_set);

        let incident: Vec<(NodeIndex, EdgeIndex)> = self
            .graph
            .edges(t)
            .filter(|e| !self.hidden_edges[e.id().index()])
            .map(|e| {
                let other = if e.source() == t { e.target() } else { e.source() };
                (other, e.id())
            })
            .collect();

        for (u, eidx) in incident {
            let data = self.graph.edge_weight(eidx).unwrap().clone();
            self.hidden_edges[eidx.index()] = true;
            if u == s {
                continue;
            }
            match self
                .graph
                .find_edge(s, u)
                .filter(|&e| !self.hidden_edges[e.index()])
            {
                Some(existing) => {
                    let ex = self.graph.edge_weight_mut(existing).unwrap();
                    ex.weight += data.weight;
                    ex.freq += data.freq;
                }
                None => {
                    self.graph.add_edge(s, u, data);
                    self.hidden_edges.push(false);
                }
            }
        }

        self.hidden_nodes[t.index()] = true;
    }

    pub fn hide_node(&mut self, n: NodeIndex) {
        self.hidden_nodes[n.index()] = true;
    }

    pub fn restore_node(&mut self, n: NodeIndex) {
        self.hidden_nodes[n.index()] = false;
    }

    pub fn hide_edge(&mut self, e: EdgeIndex) {
        self.hidden_edges[e.index()] = true;
    }

    pub fn restore_edge(&mut self, e: EdgeIndex) {
        self.hidden_edges[e.index()] = false;
    }

    pub fn is_edge_hidden(&self, e: EdgeIndex) -> bool {
        self.hidden_edges[e.index()]
    }

    pub fn is_node_hidden(&self, n: NodeIndex) -> bool {
        self.hidden_nodes[n.index()]
    }

    pub fn live_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(move |&n| !self.hidden_nodes[n.index()])
    }

    pub fn live_edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices().filter(move |&e| {
            if self.hidden_edges[e.index()] {
                return false;
            }
            let (a, b) = self.graph.edge_endpoints(e).unwrap();
            !self.hidden_nodes[a.index()] && !self.hidden_nodes[b.index()]
        })
    }

    pub fn live_neighbors(&self, n: NodeIndex) -> impl Iterator<Item = (NodeIndex, EdgeIndex)> + '_ {
        self.graph.edges(n).filter_map(move |e| {
            if self.hidden_edges[e.id().index()] {
                return None;
            }
            let other = if e.source() == n { e.target() } else { e.source() };
            if self.hidden_nodes[other.index()] {
                return None;
            }
            Some((other, e.id()))
        })
    }

    /// spec §4.B "components": partition of live nodes into connected
    /// components via BFS.
    pub fn components(&self) -> Vec<Vec<NodeIndex>> {
        let mut visited = HashSet::new();
        let mut comps = Vec::new();
        for n in self.live_nodes() {
            if visited.contains(&n) {
                continue;
            }
            let mut comp = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back(n);
            visited.insert(n);
            while let Some(cur) = queue.pop_front() {
                comp.push(cur);
                for (other, _) in self.live_neighbors(cur) {
                    if visited.insert(other) {
                        queue.push_back(other);
                    }
                }
            }
            comps.push(comp);
        }
        comps
    }

    /// spec §4.B "is-connected": `components().count == 1` (an empty
    /// graph is connected).
    pub fn is_connected(&self) -> bool {
        self.components().len() <= 1
    }

    /// The `freq` of the live edge between two *original* labels, used
    /// by the ROD1 contraction step to query CO/fan frequencies (spec
    /// §4.D phase 2). Zero if either label never had `add_node` called,
    /// or no edge exists.
    pub fn freq_between_labels(&self, a: LabelId, b: LabelId) -> i64 {
        let (na, nb) = match (self.forward.get(&a), self.forward.get(&b)) {
            (Some(&na), Some(&nb)) => (na, nb),
            _ => return 0,
        };
        if na == nb {
            return 0;
        }
        match self.graph.find_edge(na, nb) {
            Some(e) if !self.hidden_edges[e.index()] => self.graph[e].freq,
            _ => 0,
        }
    }
}

/// spec §4.G step 1 ("Build ST"), rebuilt fresh at every recursion level
/// from that level's (possibly pruned) trees: for each tree with weight
/// w(t), look only at the root's own children — a non-leaf child
/// contributes an edge of weight w(t) for every pair of labels in its
/// cluster; a leaf child is added as an isolated node. Deeper structure
/// is not visited here: it is captured by the recursion rebuilding ST
/// from further-pruned trees at the next level down. Returns the built
/// graph and wsum, the sum of this level's source-tree weights.
///
/// Grounded on `original_source/supertree.cpp`'s `MinCutSupertree` main
/// loop (the `n = root->GetChild(); while (n) { ...; n = n->GetSibling(); }`
/// traversal), verified against the "two identical trees reproduce the
/// input" boundary property — a pass over every internal node at every
/// depth over-counts nested clusters and fails that property.
pub fn build_st_graph(trees: &[Tree]) -> (StGraph, i64) {
    let mut st = StGraph::new();
    let mut wsum = 0i64;

    for t in trees {
        wsum += t.weight as i64;
        let root = match t.get_root() {
            Some(r) => r,
            None => continue,
        };
        let root_node = match t.get_node(root) {
            Some(n) => n,
            None => continue,
        };

        if root_node.is_leaf() {
            if let Some(cluster) = t.label_cluster(root) {
                for &label in cluster {
                    st.add_node(label);
                }
            }
            continue;
        }

        for &child in &root_node.children {
            let is_leaf_child = t.get_node(child).map(|n| n.is_leaf()).unwrap_or(false);
            let cluster = match t.label_cluster(child) {
                Some(c) => c,
                None => continue,
            };
            for &label in cluster {
                st.add_node(label);
            }
            if is_leaf_child {
                continue;
            }
            let members: Vec<LabelId> = cluster.iter().copied().collect();
            for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    st.add_edge(members[i], members[j], t.weight as i64);
                }
            }
        }
    }

    (st, wsum)
}

/// spec §4.C: CO graph — an edge between two labels is present once
/// per source tree containing both, regardless of tree structure. Built
/// once from the full, unrestricted input trees and shared read-only
/// by every recursion level thereafter (spec §5): unlike ST and fan,
/// whether two original labels co-occur in a source tree does not
/// change as V shrinks during recursion.
pub fn build_co_graph(trees: &[Tree]) -> StGraph {
    let mut co = StGraph::new();
    for t in trees {
        let root = match t.get_root() {
            Some(r) => r,
            None => continue,
        };
        let leaves = match t.label_cluster(root) {
            Some(c) => c.iter().copied().collect::<Vec<_>>(),
            None => continue,
        };
        for &label in &leaves {
            co.add_node(label);
        }
        for i in 0..leaves.len() {
            for j in (i + 1)..leaves.len() {
                co.add_edge(leaves[i], leaves[j], 1);
            }
        }
    }
    co
}

/// spec §4.C: fan graph, rebuilt fresh at every recursion level. Only
/// the root of each (pruned) tree is checked for fan-ness (more than
/// two children) — same reasoning as `build_st_graph`: a fan nested
/// deeper than the root is picked up when the recursion reaches that
/// level. For a fan root, one edge per pair of labels descending from
/// distinct children.
///
/// Grounded on `original_source/supertree.cpp`'s `MakeSTEmax` ROD1
/// block (`if (root->GetDegree() > 2) { ... }`, lines ~890-930).
pub fn build_fan_graph(trees: &[Tree]) -> StGraph {
    let mut fan = StGraph::new();
    for t in trees {
        let root = match t.get_root() {
            Some(r) => r,
            None => continue,
        };
        let root_node = match t.get_node(root) {
            Some(n) => n,
            None => continue,
        };
        if !root_node.is_fan() {
            continue;
        }
        let children = root_node.children.clone();
        for ci in 0..children.len() {
            for cj in (ci + 1)..children.len() {
                let left: Vec<LabelId> = t
                    .label_cluster(children[ci])
                    .map(|c| c.iter().copied().collect())
                    .unwrap_or_default();
                let right: Vec<LabelId> = t
                    .label_cluster(children[cj])
                    .map(|c| c.iter().copied().collect())
                    .unwrap_or_default();
                for &a in &left {
                    fan.add_node(a);
                }
                for &b in &right {
                    fan.add_node(b);
                }
                for &a in &left {
                    for &b in &right {
                        fan.add_edge(a, b, 1);
                    }
                }
            }
        }
    }
    fan
}
