use crate::libs::supertree::label::LabelId;
use crate::libs::supertree::stgraph::StGraph;
use crate::libs::supertree::tree::Tree;

/// spec §6 `-c <k>` diagnostic mode: a proper-cluster graph built from
/// every internal node whose cluster has at most `k` labels, rather
/// than the main algorithm's root-children-only `build_st_graph`. Lets
/// a caller inspect how agreement/conflict among small clusters compares
/// to the full recursion's edge set, without running any contraction or
/// min-cut.
pub fn build_k_cluster_graph(trees: &[Tree], k: usize) -> StGraph {
    let mut graph = StGraph::new();
    for t in trees {
        let root = match t.get_root() {
            Some(r) => r,
            None => continue,
        };
        for id in t.preorder(root) {
            let cluster = match t.label_cluster(id) {
                Some(c) => c,
                None => continue,
            };
            if cluster.is_empty() {
                continue;
            }
            let members: Vec<LabelId> = cluster.iter().copied().collect();
            for &label in &members {
                graph.add_node(label);
            }
            if members.len() < 2 || members.len() > k {
                continue;
            }
            for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    graph.add_edge(members[i], members[j], t.weight as i64);
                }
            }
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::supertree::label::LabelTable;
    use crate::libs::supertree::node::Node;

    fn quartet(labels: &mut LabelTable) -> Tree {
        let mut t = Tree::new();
        let root = t.add_node();
        let ab = t.add_node();
        let cd = t.add_node();
        let names = ["A", "B", "C", "D"];
        let mut leaves = Vec::new();
        for name in names {
            let id = t.add_node();
            *t.get_node_mut(id).unwrap() = Node::new(id).with_name(name);
            leaves.push(id);
        }
        t.add_child(ab, leaves[0]).unwrap();
        t.add_child(ab, leaves[1]).unwrap();
        t.add_child(cd, leaves[2]).unwrap();
        t.add_child(cd, leaves[3]).unwrap();
        t.add_child(root, ab).unwrap();
        t.add_child(root, cd).unwrap();
        t.set_root(root);
        t.update();
        t.build_label_clusters(labels);
        t
    }

    #[test]
    fn k_two_only_keeps_the_pair_clusters() {
        let mut labels = LabelTable::new();
        let t = quartet(&mut labels);
        let graph = build_k_cluster_graph(&[t], 2);
        let a = labels.get("A").unwrap();
        let b = labels.get("B").unwrap();
        let c = labels.get("C").unwrap();
        assert_eq!(graph.freq_between_labels(a, b), 1);
        assert_eq!(graph.freq_between_labels(a, c), 0);
    }

    #[test]
    fn k_covering_the_whole_tree_adds_the_root_cluster_too() {
        let mut labels = LabelTable::new();
        let t = quartet(&mut labels);
        let graph = build_k_cluster_graph(&[t], 4);
        let a = labels.get("A").unwrap();
        let c = labels.get("C").unwrap();
        assert_eq!(graph.freq_between_labels(a, c), 1);
    }
}
