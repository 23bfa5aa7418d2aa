use crate::libs::supertree::label::LabelId;
use crate::libs::supertree::stgraph::StGraph;
use petgraph::graph::{EdgeIndex, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

struct Arc {
    to: usize,
    cap: i64,
    flow: i64,
}

/// Two directed arcs per undirected edge of `st`, one per direction,
/// each capacity w(e); arcs are pushed in (forward, reverse) pairs so
/// `i ^ 1` is always an arc's mate for residual bookkeeping.
struct FlowNet {
    adj: Vec<Vec<usize>>,
    arcs: Vec<Arc>,
}

impl FlowNet {
    fn new(n: usize) -> Self {
        Self { adj: vec![Vec::new(); n], arcs: Vec::new() }
    }

    fn add_undirected(&mut self, u: usize, v: usize, cap: i64) {
        let fwd = self.arcs.len();
        self.arcs.push(Arc { to: v, cap, flow: 0 });
        self.adj[u].push(fwd);
        let rev = self.arcs.len();
        self.arcs.push(Arc { to: u, cap, flow: 0 });
        self.adj[v].push(rev);
    }

    fn residual(&self, arc: usize) -> i64 {
        self.arcs[arc].cap - self.arcs[arc].flow
    }

    /// Edmonds-Karp: repeatedly augment along a shortest (by arc count)
    /// residual-capacity path from `s` to `t`.
    fn max_flow(&mut self, s: usize, t: usize) -> i64 {
        let n = self.adj.len();
        let mut total = 0i64;
        loop {
            let mut prev_arc: Vec<Option<usize>> = vec![None; n];
            let mut visited = vec![false; n];
            visited[s] = true;
            let mut queue = VecDeque::new();
            queue.push_back(s);
            while let Some(u) = queue.pop_front() {
                if u == t {
                    break;
                }
                for &a in &self.adj[u] {
                    let v = self.arcs[a].to;
                    if !visited[v] && self.residual(a) > 0 {
                        visited[v] = true;
                        prev_arc[v] = Some(a);
                        queue.push_back(v);
                    }
                }
            }
            if !visited[t] {
                break;
            }
            let mut bottleneck = i64::MAX;
            let mut cur = t;
            while cur != s {
                let a = prev_arc[cur].unwrap();
                bottleneck = bottleneck.min(self.residual(a));
                cur = self.arcs[a ^ 1].to;
            }
            let mut cur = t;
            while cur != s {
                let a = prev_arc[cur].unwrap();
                self.arcs[a].flow += bottleneck;
                self.arcs[a ^ 1].flow -= bottleneck;
                cur = self.arcs[a ^ 1].to;
            }
            total += bottleneck;
        }
        total
    }
}

/// Tarjan's SCC over the residual graph (arcs with residual capacity
/// greater than zero), using an explicit stack rather than recursion —
/// the residual graph's depth can reach one frame per live node.
fn residual_sccs(net: &FlowNet, n: usize) -> Vec<usize> {
    let mut index = vec![None; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut scc_of = vec![usize::MAX; n];
    let mut next_index = 0usize;
    let mut next_scc = 0usize;

    enum Frame {
        Enter(usize),
        Continue(usize, usize), // node, next adjacency offset to resume from
    }

    for start in 0..n {
        if index[start].is_some() {
            continue;
        }
        let mut work = vec![Frame::Enter(start)];
        while let Some(frame) = work.pop() {
            match frame {
                Frame::Enter(v) => {
                    index[v] = Some(next_index);
                    lowlink[v] = next_index;
                    next_index += 1;
                    stack.push(v);
                    on_stack[v] = true;
                    work.push(Frame::Continue(v, 0));
                }
                Frame::Continue(v, off) => {
                    let neighbors: Vec<usize> = net.adj[v]
                        .iter()
                        .filter(|&&a| net.residual(a) > 0)
                        .map(|&a| net.arcs[a].to)
                        .collect();
                    let mut off = off;
                    let mut recursed = false;
                    while off < neighbors.len() {
                        let w = neighbors[off];
                        off += 1;
                        if index[w].is_none() {
                            work.push(Frame::Continue(v, off));
                            work.push(Frame::Enter(w));
                            recursed = true;
                            break;
                        } else if on_stack[w] {
                            lowlink[v] = lowlink[v].min(index[w].unwrap());
                        }
                    }
                    if recursed {
                        continue;
                    }
                    // All neighbors processed: propagate lowlink to parent
                    // (the frame just below this one on `work`, if any)
                    // on pop, then close the SCC if v is a root.
                    if lowlink[v] == index[v].unwrap() {
                        loop {
                            let w = stack.pop().unwrap();
                            on_stack[w] = false;
                            scc_of[w] = next_scc;
                            if w == v {
                                break;
                            }
                        }
                        next_scc += 1;
                    }
                    if let Some(Frame::Continue(parent, _)) = work.last() {
                        lowlink[*parent] = lowlink[*parent].min(lowlink[v]);
                    }
                }
            }
        }
    }
    scc_of
}

/// spec §4.F: Picard-Queyranne all-minimum-cuts extraction. For each
/// min-cut witness pair `(s, t)`, runs max-flow on a directed working
/// copy of `st` (each undirected edge becomes a capacity-w(e) arc in
/// both directions) and computes the strongly connected components of
/// the residual graph; an edge of `st` belongs to *some* minimum cut
/// realizing the global min-cut value iff its endpoints land in
/// different residual SCCs for at least one witness pair. Returns the
/// union of such edges over all witnesses.
pub fn all_min_cuts(st: &StGraph, witnesses: &[(LabelId, LabelId)]) -> HashSet<EdgeIndex> {
    let mut cut_edges = HashSet::new();
    if witnesses.is_empty() {
        return cut_edges;
    }

    let live: Vec<NodeIndex> = st.live_nodes().collect();
    let index_of: HashMap<NodeIndex, usize> =
        live.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    let live_edges: Vec<EdgeIndex> = st.live_edges().collect();

    for &(s_label, t_label) in witnesses {
        let (s_idx, t_idx) = match (st.node_index(s_label), st.node_index(t_label)) {
            (Some(s), Some(t)) => (s, t),
            _ => continue,
        };
        let (&s, &t) = match (index_of.get(&s_idx), index_of.get(&t_idx)) {
            (Some(s), Some(t)) => (s, t),
            _ => continue,
        };

        let mut net = FlowNet::new(live.len());
        for &e in &live_edges {
            let (a, b) = st.graph.edge_endpoints(e).unwrap();
            let (Some(&ai), Some(&bi)) = (index_of.get(&a), index_of.get(&b)) else {
                continue;
            };
            net.add_undirected(ai, bi, st.graph[e].weight);
        }
        net.max_flow(s, t);

        let scc = residual_sccs(&net, live.len());
        for &e in &live_edges {
            let (a, b) = st.graph.edge_endpoints(e).unwrap();
            let (Some(&ai), Some(&bi)) = (index_of.get(&a), index_of.get(&b)) else {
                continue;
            };
            if scc[ai] != scc[bi] {
                cut_edges.insert(e);
            }
        }
    }

    cut_edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::supertree::label::LabelTable;
    use crate::libs::supertree::mincut::stoer_wagner;

    #[test]
    fn single_edge_is_the_only_cut() {
        let mut labels = LabelTable::new();
        let a = labels.intern("A");
        let b = labels.intern("B");
        let mut st = StGraph::new();
        st.add_node(a);
        st.add_node(b);
        st.add_edge(a, b, 3);

        let (_, witnesses) = stoer_wagner(&st);
        let cuts = all_min_cuts(&st, &witnesses);
        assert_eq!(cuts.len(), 1);
    }

    #[test]
    fn triangle_has_no_single_edge_cut_below_weight_two() {
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

        let (cut, witnesses) = stoer_wagner(&st);
        assert_eq!(cut, 2);
        let cuts = all_min_cuts(&st, &witnesses);
        // a 2-regular triangle's three min-cuts each isolate a single
        // vertex; each of the triangle's three edges participates in
        // exactly one of them, so every edge is reported.
        assert_eq!(cuts.len(), 3);
    }
}
