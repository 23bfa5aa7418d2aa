use crate::libs::supertree::allmincuts::all_min_cuts;
use crate::libs::supertree::contract::{phase1_semple_steel, phase2_rod1};
use crate::libs::supertree::error::SupertreeError;
use crate::libs::supertree::label::{LabelId, LabelTable};
use crate::libs::supertree::mincut::stoer_wagner;
use crate::libs::supertree::node::NodeId;
use crate::libs::supertree::restrict::restrict_all;
use crate::libs::supertree::stgraph::{build_co_graph, build_fan_graph, build_st_graph, StGraph};
use crate::libs::supertree::tree::Tree;
use petgraph::graph::NodeIndex;
use std::collections::BTreeSet;

fn leaf_node(builder: &mut Tree, labels: &LabelTable, label: LabelId) -> NodeId {
    let id = builder.add_node();
    builder.get_node_mut(id).unwrap().name = Some(labels.name(label).to_string());
    id
}

/// Splice a deep copy of `source`'s whole structure into `builder`,
/// returning the new root. Same shape as `Tree::copy_subtree`, but
/// across two distinct arenas (spec §4.G step 4 "graft the sole pruned
/// tree under a fresh internal supertree node").
fn graft(builder: &mut Tree, source: &Tree) -> NodeId {
    let root = source
        .get_root()
        .expect("a tree that survived restrict() always has a root");

    let mut old_to_new = std::collections::HashMap::new();
    for old_id in source.preorder(root) {
        let new_id = builder.add_node();
        old_to_new.insert(old_id, new_id);
        let old_node = source.get_node(old_id).unwrap();
        let new_node = builder.get_node_mut(new_id).unwrap();
        new_node.name = old_node.name.clone();
        new_node.length = if old_id == root { None } else { old_node.length };
    }
    for old_id in source.preorder(root) {
        if let Some(old_parent) = source.get_node(old_id).unwrap().parent {
            if let Some(&new_parent) = old_to_new.get(&old_parent) {
                let new_id = old_to_new[&old_id];
                builder.add_child(new_parent, new_id).expect("fresh grafted node has no parent yet");
            }
        }
    }
    old_to_new[&root]
}

fn node_set_union(st: &StGraph, comp: &[NodeIndex]) -> BTreeSet<LabelId> {
    let mut set = BTreeSet::new();
    for &n in comp {
        set.extend(st.node_set(n).iter().copied());
    }
    set
}

/// Callback invoked with each level's ST (`"ST"`) and, when ROD1 runs,
/// post-contraction ST/Eₘₐₓ (`"STEmax"`) graph, tagged by a run-wide
/// sequential counter (spec §6 `-g`/`-d`: `ST<i>.gml`/`STEmax<i>.gml`).
pub struct Dumper<'a> {
    sink: &'a mut dyn FnMut(usize, &str, &StGraph),
    counter: usize,
}

impl<'a> Dumper<'a> {
    pub fn new(sink: &'a mut dyn FnMut(usize, &str, &StGraph)) -> Self {
        Self { sink, counter: 0 }
    }

    fn next_index(&mut self) -> usize {
        self.counter += 1;
        self.counter
    }
}

/// spec §4.G step 4: attach the subtree spanning leaf-label set `v`,
/// returning its root. `co` is the run-wide CO graph, built once from
/// the unrestricted input (spec §5).
#[allow(clippy::too_many_arguments)]
fn attach(
    trees: &[Tree],
    v: &BTreeSet<LabelId>,
    labels: &LabelTable,
    co: &StGraph,
    builder: &mut Tree,
    rod1: bool,
    level: usize,
    dump: &mut Option<&mut Dumper<'_>>,
) -> Result<NodeId, SupertreeError> {
    if v.len() == 1 {
        return Ok(leaf_node(builder, labels, *v.iter().next().unwrap()));
    }
    if v.len() == 2 {
        let mut it = v.iter();
        let a = *it.next().unwrap();
        let b = *it.next().unwrap();
        let cherry = builder.add_node();
        let la = leaf_node(builder, labels, a);
        let lb = leaf_node(builder, labels, b);
        builder
            .add_child(cherry, la)
            .and_then(|_| builder.add_child(cherry, lb))
            .map_err(|m| SupertreeError::invariant(level, 0, m))?;
        return Ok(cherry);
    }

    let restricted = restrict_all(trees, labels, v);

    if restricted.is_empty() {
        // spec §4.G step 4: "should not occur when ST was built from T".
        // No source tree carries any information relating these labels;
        // degrade to an unresolved star rather than abort, the same
        // shape produced by a disjoint-leaf-set input (spec §8 S4).
        let star = builder.add_node();
        for &label in v {
            let leaf = leaf_node(builder, labels, label);
            builder
                .add_child(star, leaf)
                .map_err(|m| SupertreeError::invariant(level, 0, m))?;
        }
        return Ok(star);
    }

    if restricted.len() == 1 {
        return Ok(graft(builder, &restricted[0]));
    }

    mincut_supertree(&restricted, v, labels, co, builder, rod1, level, dump)
}

/// spec §4.G: `mincut_supertree(T, P) -> attaches subtree at current
/// supertree node`. Here the "attach" is expressed as a return value —
/// the caller (`attach`, or the top-level `build_supertree`) links the
/// returned node in wherever it needs to go — rather than a push/pop
/// cursor, since this crate's `Tree` keeps an explicit child list per
/// node instead of the teacher's sibling-linked representation.
#[allow(clippy::too_many_arguments)]
fn mincut_supertree(
    trees: &[Tree],
    v: &BTreeSet<LabelId>,
    labels: &LabelTable,
    co: &StGraph,
    builder: &mut Tree,
    rod1: bool,
    level: usize,
    dump: &mut Option<&mut Dumper<'_>>,
) -> Result<NodeId, SupertreeError> {
    let (mut st, wsum) = build_st_graph(trees);
    let node = builder.add_node();

    if let Some(d) = dump.as_deref_mut() {
        let idx = d.next_index();
        (d.sink)(idx, "ST", &st);
    }

    // step 2: connectivity check, before any contraction.
    if !st.is_connected() {
        builder.get_node_mut(node).unwrap().name = Some("c0".to_string());
        for comp in st.components() {
            let group = node_set_union(&st, &comp);
            let child = attach(trees, &group, labels, co, builder, rod1, level + 1, dump)?;
            builder
                .add_child(node, child)
                .map_err(|m| SupertreeError::invariant(level, 0, m))?;
        }
        return Ok(node);
    }

    phase1_semple_steel(&mut st, wsum);
    let mut h_suffix = false;
    if rod1 {
        let fan = build_fan_graph(trees);
        h_suffix = phase2_rod1(&mut st, co, &fan);
    }

    if let Some(d) = dump.as_deref_mut() {
        let idx = d.counter;
        (d.sink)(idx, "STEmax", &st);
    }

    let (cut, witnesses) = stoer_wagner(&st);
    let cut_edges = all_min_cuts(&st, &witnesses);
    for e in cut_edges {
        st.hide_edge(e);
    }

    let comps = st.components();
    if comps.len() < 2 {
        return Err(SupertreeError::invariant(
            level,
            comps.len(),
            "min-cut failed to disconnect a connected ST/Emax",
        ));
    }

    let suffix = if h_suffix { "h" } else { "" };
    builder.get_node_mut(node).unwrap().name = Some(format!("c{}{}", cut, suffix));

    for comp in comps {
        let group = node_set_union(&st, &comp);
        let child = attach(trees, &group, labels, co, builder, rod1, level + 1, dump)?;
        builder
            .add_child(node, child)
            .map_err(|m| SupertreeError::invariant(level, 0, m))?;
    }
    Ok(node)
}

/// Top-level entry point: build a supertree over every label appearing
/// in `trees`.
pub fn build_supertree(trees: &[Tree], labels: &LabelTable, rod1: bool) -> Result<Tree, SupertreeError> {
    build_supertree_with_dump(trees, labels, rod1, None)
}

/// Same as `build_supertree`, additionally handing every intermediate ST
/// and (when `rod1`) post-contraction ST/Eₘₐₓ graph to `dumper` as it is
/// built (spec §6 `-g`/`-d`).
pub fn build_supertree_with_dump(
    trees: &[Tree],
    labels: &LabelTable,
    rod1: bool,
    mut dumper: Option<&mut Dumper<'_>>,
) -> Result<Tree, SupertreeError> {
    let co = build_co_graph(trees);

    let v: BTreeSet<LabelId> = trees
        .iter()
        .flat_map(|t| t.leaf_label_ids(labels))
        .collect();
    if v.is_empty() {
        return Err(SupertreeError::invariant(0, 0, "no labels in input"));
    }

    let mut builder = Tree::new();
    let root = attach(trees, &v, labels, &co, &mut builder, rod1, 0, &mut dumper)?;
    builder.set_root(root);
    builder.update();
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::supertree::node::Node;

    fn cherry_plus_outgroup(labels: &mut LabelTable, a: &str, b: &str, c: &str) -> Tree {
        let mut t = Tree::new();
        let root = t.add_node();
        let cherry = t.add_node();
        let na = t.add_node();
        let nb = t.add_node();
        let nc = t.add_node();
        *t.get_node_mut(na).unwrap() = Node::new(na).with_name(a);
        *t.get_node_mut(nb).unwrap() = Node::new(nb).with_name(b);
        *t.get_node_mut(nc).unwrap() = Node::new(nc).with_name(c);
        t.add_child(cherry, na).unwrap();
        t.add_child(cherry, nb).unwrap();
        t.add_child(root, cherry).unwrap();
        t.add_child(root, nc).unwrap();
        t.set_root(root);
        t.update();
        t.build_label_clusters(labels);
        t
    }

    /// Two copies of the same resolved triplet: the supertree equals the
    /// input, via the cheap "already disconnected" path (spec §8, the
    /// "identical trees" boundary property) — no min-cut needed because
    /// agreeing top-level splits never share an ST edge.
    #[test]
    fn identical_triplets_reproduce_the_input() {
        let mut labels = LabelTable::new();
        let t1 = cherry_plus_outgroup(&mut labels, "A", "B", "C");
        let t2 = cherry_plus_outgroup(&mut labels, "A", "B", "C");
        let supertree = build_supertree(&[t1, t2], &labels, false).unwrap();

        let root = supertree.get_root().unwrap();
        assert_eq!(supertree.get_node(root).unwrap().name.as_deref(), Some("c0"));
        assert_eq!(supertree.get_node(root).unwrap().children.len(), 2);
        let mut names = supertree.leaf_names();
        names.sort();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    /// `((A,B),C)` against `(A,(B,C))`: the two trees disagree about
    /// every top-level split, so the genuine min-cut path runs and,
    /// since both splits tie at the minimum cut value, all-mins-cut
    /// hides both ST edges — the correct result is the fully
    /// unresolved star, not an arbitrary pick of one disagreement.
    #[test]
    fn contradictory_triplets_collapse_to_a_star() {
        let mut labels = LabelTable::new();
        let t1 = cherry_plus_outgroup(&mut labels, "A", "B", "C");
        let t2 = cherry_plus_outgroup(&mut labels, "B", "C", "A");
        let supertree = build_supertree(&[t1, t2], &labels, false).unwrap();

        let root = supertree.get_root().unwrap();
        let node = supertree.get_node(root).unwrap();
        assert_eq!(node.name.as_deref(), Some("c1"));
        assert_eq!(node.children.len(), 3);
        let mut names = supertree.leaf_names();
        names.sort();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn disjoint_leaf_sets_form_a_star() {
        let mut labels = LabelTable::new();
        let mut t1 = Tree::new();
        let a = t1.add_node();
        let b = t1.add_node();
        let cherry = t1.add_node();
        *t1.get_node_mut(a).unwrap() = Node::new(a).with_name("A");
        *t1.get_node_mut(b).unwrap() = Node::new(b).with_name("B");
        t1.add_child(cherry, a).unwrap();
        t1.add_child(cherry, b).unwrap();
        t1.set_root(cherry);
        t1.update();
        t1.build_label_clusters(&mut labels);

        let mut t2 = Tree::new();
        let c = t2.add_node();
        let d = t2.add_node();
        let cherry2 = t2.add_node();
        *t2.get_node_mut(c).unwrap() = Node::new(c).with_name("C");
        *t2.get_node_mut(d).unwrap() = Node::new(d).with_name("D");
        t2.add_child(cherry2, c).unwrap();
        t2.add_child(cherry2, d).unwrap();
        t2.set_root(cherry2);
        t2.update();
        t2.build_label_clusters(&mut labels);

        let supertree = build_supertree(&[t1, t2], &labels, false).unwrap();
        let root = supertree.get_root().unwrap();
        assert_eq!(supertree.get_node(root).unwrap().name.as_deref(), Some("c0"));
        assert_eq!(supertree.get_node(root).unwrap().children.len(), 2);
    }
}
