use crate::libs::supertree::stgraph::{EdgeColour, StGraph};
use petgraph::graph::NodeIndex;
use std::collections::{HashSet, VecDeque};

/// spec §4.D phase 1 (Semple-Steel contraction): collect all edges with
/// w(e) = wsum; iteratively merge each such edge's endpoints until none
/// remain. Re-deriving the live-edge list every iteration makes the
/// "remove any other already-listed edges incident to t" bookkeeping
/// automatic: merging hides or re-endpoints t's edges, so they simply
/// drop out of (or move within) the next iteration's candidate list.
pub fn phase1_semple_steel(st: &mut StGraph, wsum: i64) {
    loop {
        let candidate = st.live_edges().find(|&e| st.graph[e].weight == wsum);
        let e = match candidate {
            Some(e) => e,
            None => break,
        };
        let (a, b) = st.graph.edge_endpoints(e).unwrap();
        let s_label = *st.node_set(a).iter().next().unwrap();
        let t_label = *st.node_set(b).iter().next().unwrap();
        st.merge(s_label, t_label);
    }
}

fn components_excluding<F>(st: &StGraph, exclude: F) -> Vec<Vec<NodeIndex>>
where
    F: Fn(EdgeColour) -> bool,
{
    let mut visited = HashSet::new();
    let mut comps = Vec::new();
    for n in st.live_nodes() {
        if visited.contains(&n) {
            continue;
        }
        let mut comp = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(n);
        visited.insert(n);
        while let Some(cur) = queue.pop_front() {
            comp.push(cur);
            for (other, eidx) in st.live_neighbors(cur) {
                if exclude(st.graph[eidx].colour) {
                    continue;
                }
                if visited.insert(other) {
                    queue.push_back(other);
                }
            }
        }
        comps.push(comp);
    }
    comps
}

fn is_connected_excluding<F>(st: &StGraph, exclude: F) -> bool
where
    F: Fn(EdgeColour) -> bool,
{
    components_excluding(st, exclude).len() <= 1
}

fn sum_freq_over_node_sets(
    graph: &StGraph,
    a: &std::collections::BTreeSet<crate::libs::supertree::label::LabelId>,
    b: &std::collections::BTreeSet<crate::libs::supertree::label::LabelId>,
) -> i64 {
    let mut total = 0;
    for &x in a {
        for &y in b {
            total += graph.freq_between_labels(x, y);
        }
    }
    total
}

/// spec §4.D phase 2 (ROD1 extension). Returns whether the graph was
/// already disconnected after hiding *only* contradicted edges (before
/// adjacent-to-contradicted recoloring) — per spec §9's resolution of
/// the "trailing `h`" open question, this flags a contradicted-only cut.
pub fn phase2_rod1(st: &mut StGraph, co: &StGraph, fan: &StGraph) -> bool {
    let edges: Vec<_> = st.live_edges().collect();

    for &e in &edges {
        let (a, b) = st.graph.edge_endpoints(e).unwrap();
        let f_nested = st.graph[e].freq;
        let f_co = sum_freq_over_node_sets(co, st.node_set(a), st.node_set(b));
        let f_fan = sum_freq_over_node_sets(fan, st.node_set(a), st.node_set(b));
        let conflict = f_co - f_nested - f_fan;
        st.graph[e].colour = if conflict != 0 {
            EdgeColour::Contradicted
        } else {
            EdgeColour::Uncontradicted
        };
    }

    let disconnected_on_contradicted_only =
        !is_connected_excluding(st, |c| c == EdgeColour::Contradicted);

    // Recolor any edge adjacent to both endpoints of a contradicted
    // edge — sharing a third node with it on both sides — as
    // adjacent-to-contradicted, so it is not merged away below either.
    for &e in &edges {
        if st.graph[e].colour != EdgeColour::Contradicted {
            continue;
        }
        let (s, t) = st.graph.edge_endpoints(e).unwrap();
        let s_neighbors: HashSet<NodeIndex> = st
            .live_neighbors(s)
            .filter(|&(_, ei)| st.graph[ei].colour != EdgeColour::Contradicted)
            .map(|(n, _)| n)
            .collect();

        let t_adj: Vec<_> = st
            .live_neighbors(t)
            .filter(|&(_, ei)| st.graph[ei].colour != EdgeColour::Contradicted)
            .collect();
        let mut shared = HashSet::new();
        for (n, ei) in t_adj {
            if s_neighbors.contains(&n) {
                shared.insert(n);
                st.graph[ei].colour = EdgeColour::AdjacentToContradicted;
            }
        }
        let s_adj: Vec<_> = st.live_neighbors(s).collect();
        for (n, ei) in s_adj {
            if shared.contains(&n) {
                st.graph[ei].colour = EdgeColour::AdjacentToContradicted;
            }
        }
    }

    let comps = components_excluding(st, |c| c != EdgeColour::Uncontradicted);
    if comps.len() > 1 {
        for comp in comps {
            if comp.len() < 2 {
                continue;
            }
            let rep_label = *st.node_set(comp[0]).iter().next().unwrap();
            for &n in &comp[1..] {
                let label = *st.node_set(n).iter().next().unwrap();
                st.merge(rep_label, label);
            }
        }
    }

    disconnected_on_contradicted_only
}
