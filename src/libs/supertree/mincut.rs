use crate::libs::supertree::label::LabelId;
use crate::libs::supertree::stgraph::StGraph;
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet};

/// One Stoer-Wagner phase: grow an "A-set" from an arbitrary start node
/// by repeatedly adding the live, not-yet-added node with the highest
/// tightness (sum of edge weights to the A-set), then merge the last
/// two nodes added. Returns the labels of the last two nodes added
/// (s, t) and the cut-of-the-phase (tightness of the last one, `t`).
fn min_cut_phase(work: &StGraph, live: &[NodeIndex]) -> (LabelId, LabelId, i64) {
    let mut added: HashSet<NodeIndex> = HashSet::new();
    let mut tightness: HashMap<NodeIndex, i64> = live.iter().map(|&n| (n, 0)).collect();

    let a = live[0];
    added.insert(a);
    for (other, eidx) in work.live_neighbors(a) {
        *tightness.entry(other).or_insert(0) += work.graph[eidx].weight;
    }

    let mut order = vec![a];
    while added.len() < live.len() {
        let next = live
            .iter()
            .filter(|n| !added.contains(n))
            .max_by_key(|n| tightness[n])
            .copied()
            .expect("live set nonempty while added.len() < live.len()");
        added.insert(next);
        order.push(next);
        for (other, eidx) in work.live_neighbors(next) {
            if !added.contains(&other) {
                *tightness.entry(other).or_insert(0) += work.graph[eidx].weight;
            }
        }
    }

    let t = order[order.len() - 1];
    let s = order[order.len() - 2];
    let cut_of_phase = tightness[&t];

    let s_label = *work.node_set(s).iter().next().unwrap();
    let t_label = *work.node_set(t).iter().next().unwrap();
    (s_label, t_label, cut_of_phase)
}

/// spec §4.E: Stoer-Wagner global min-cut on an undirected weighted
/// multigraph. Runs on a private clone of `st` so the caller's graph
/// (needed intact by §4.F) is left untouched; merges during the
/// algorithm happen only on that clone.
///
/// If `st` is disconnected at entry, or has fewer than two live nodes
/// (the whole frame has already fully resolved into one supernode — see
/// DESIGN.md), returns a cut value of 0 and no witnesses without
/// running any phase.
pub fn stoer_wagner(st: &StGraph) -> (i64, Vec<(LabelId, LabelId)>) {
    if !st.is_connected() {
        return (0, Vec::new());
    }
    let n = st.live_nodes().count();
    if n < 2 {
        return (0, Vec::new());
    }

    let mut work = st.clone();
    let mut best_cut = i64::MAX;
    let mut witnesses = Vec::new();

    let mut remaining = n;
    while remaining >= 2 {
        let live: Vec<NodeIndex> = work.live_nodes().collect();
        let (s_label, t_label, cut_of_phase) = min_cut_phase(&work, &live);

        if cut_of_phase < best_cut {
            best_cut = cut_of_phase;
            witnesses.clear();
            witnesses.push((s_label, t_label));
        } else if cut_of_phase == best_cut {
            witnesses.push((s_label, t_label));
        }

        work.merge(s_label, t_label);
        remaining -= 1;
    }

    (best_cut, witnesses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::supertree::label::LabelTable;

    fn triangle() -> StGraph {
        let mut labels = LabelTable::new();
        let a = labels.intern("A");
        let b = labels.intern("B");
        let c = labels.intern("C");
        let mut st = StGraph::new();
        st.add_node(a);
        st.add_node(b);
        st.add_node(c);
        st.add_edge(a, b, 1);
        st.add_edge(a, c, 1);
        st.add_edge(b, c, 1);
        st
    }

    #[test]
    fn s1_triangle_min_cut_is_two() {
        let st = triangle();
        let (cut, witnesses) = stoer_wagner(&st);
        assert_eq!(cut, 2);
        assert!(!witnesses.is_empty());
    }

    #[test]
    fn single_edge_min_cut_is_its_weight() {
        let mut labels = LabelTable::new();
        let a = labels.intern("A");
        let b = labels.intern("B");
        let mut st = StGraph::new();
        st.add_node(a);
        st.add_node(b);
        st.add_edge(a, b, 5);
        let (cut, witnesses) = stoer_wagner(&st);
        assert_eq!(cut, 5);
        assert_eq!(witnesses, vec![(a, b)]);
    }

    #[test]
    fn disconnected_graph_short_circuits() {
        let mut labels = LabelTable::new();
        let a = labels.intern("A");
        let b = labels.intern("B");
        let mut st = StGraph::new();
        st.add_node(a);
        st.add_node(b);
        let (cut, witnesses) = stoer_wagner(&st);
        assert_eq!(cut, 0);
        assert!(witnesses.is_empty());
    }
}
