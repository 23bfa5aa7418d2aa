use crate::libs::supertree::label::LabelTable;
use crate::libs::supertree::node::NodeId;
use crate::libs::supertree::stgraph::StGraph;
use crate::libs::supertree::tree::Tree;

fn stgraph_node_label(st: &StGraph, idx: petgraph::graph::NodeIndex, labels: &LabelTable, human: bool) -> String {
    let members: Vec<String> = st
        .node_set(idx)
        .iter()
        .map(|&l| if human { labels.name(l).to_string() } else { l.0.to_string() })
        .collect();
    members.join("+")
}

/// GML dump of an intermediate ST or ST/Eₘₐₓ graph (spec §6 `-g`).
pub fn write_stgraph_gml(st: &StGraph, labels: &LabelTable, human: bool) -> String {
    let mut s = String::from("graph [\n    directed 0\n");
    for n in st.live_nodes() {
        let label = stgraph_node_label(st, n, labels, human);
        s.push_str(&format!("    node [\n        id {}\n        label \"{}\"\n    ]\n", n.index(), label));
    }
    for e in st.live_edges() {
        let (a, b) = st.graph.edge_endpoints(e).unwrap();
        let weight = st.graph.edge_weight(e).unwrap().weight;
        s.push_str(&format!(
            "    edge [\n        source {}\n        target {}\n        weight {}\n    ]\n",
            a.index(),
            b.index(),
            weight
        ));
    }
    s.push_str("]\n");
    s
}

/// Graphviz DOT dump of an intermediate ST or ST/Eₘₐₓ graph (spec §6 `-d`).
pub fn write_stgraph_dot(st: &StGraph, labels: &LabelTable, human: bool) -> String {
    let mut s = String::from("graph ST {\n    node [shape=ellipse];\n");
    for n in st.live_nodes() {
        let label = stgraph_node_label(st, n, labels, human);
        s.push_str(&format!("    {} [label=\"{}\"];\n", n.index(), label));
    }
    for e in st.live_edges() {
        let (a, b) = st.graph.edge_endpoints(e).unwrap();
        let weight = st.graph.edge_weight(e).unwrap().weight;
        s.push_str(&format!("    {} -- {} [label=\"{}\"];\n", a.index(), b.index(), weight));
    }
    s.push_str("}\n");
    s
}

fn quote_label(label: &str) -> String {
    if label.chars().any(|c| "(),:;[] \t\n".contains(c)) {
        format!("'{}'", label)
    } else {
        label.to_string()
    }
}

/// Compact Newick serialization (spec §6 output formats).
pub fn write_newick(tree: &Tree) -> String {
    match tree.get_root() {
        Some(root) => {
            let mut s = newick_recursive(tree, root);
            s.push(';');
            s
        }
        None => ";".to_string(),
    }
}

fn newick_recursive(tree: &Tree, id: NodeId) -> String {
    let node = tree.get_node(id).unwrap();
    let mut info = String::new();
    if let Some(name) = &node.name {
        info.push_str(&quote_label(name));
    }
    if let Some(len) = node.length {
        info.push_str(&format!(":{len}"));
    }
    if node.children.is_empty() {
        info
    } else {
        let children: Vec<String> = node.children.iter().map(|&c| newick_recursive(tree, c)).collect();
        format!("({}){}", children.join(","), info)
    }
}

/// `#nexus` output with a single `begin trees; ... end;` block (spec §6).
/// `[&R]` marks the stored tree as rooted, matching how this crate
/// always treats its own supertree's topology.
pub fn write_nexus(tree: &Tree, tree_name: &str) -> String {
    format!(
        "#nexus\n\nbegin trees;\n\ttree {} = [&R] {}\nend;\n",
        tree_name,
        write_newick(tree)
    )
}

/// Graphviz DOT serialization, for `-d` intermediate dumps of the
/// working ST/STEmax graphs as well as the final supertree.
pub fn write_dot(tree: &Tree) -> String {
    let mut s = String::from("digraph Tree {\n    node [shape=box];\n");
    if let Some(root) = tree.get_root() {
        for id in tree.preorder(root) {
            let node = tree.get_node(id).unwrap();
            let label = node.name.as_deref().unwrap_or("");
            s.push_str(&format!("    {} [label=\"{}\"];\n", id, label));
            for &child in &node.children {
                let child_node = tree.get_node(child).unwrap();
                match child_node.length {
                    Some(len) => s.push_str(&format!("    {} -> {} [label=\"{}\"];\n", id, child, len)),
                    None => s.push_str(&format!("    {} -> {};\n", id, child)),
                }
            }
        }
    }
    s.push_str("}\n");
    s
}

/// GML serialization, the `-g` counterpart to `-d`'s DOT dumps (spec §6).
pub fn write_gml(tree: &Tree) -> String {
    let mut s = String::from("graph [\n    directed 1\n");
    if let Some(root) = tree.get_root() {
        for id in tree.preorder(root) {
            let node = tree.get_node(id).unwrap();
            let label = node.name.as_deref().unwrap_or("");
            s.push_str(&format!("    node [\n        id {}\n        label \"{}\"\n    ]\n", id, label));
            for &child in &node.children {
                s.push_str(&format!("    edge [\n        source {}\n        target {}\n    ]\n", id, child));
            }
        }
    }
    s.push_str("]\n");
    s
}

struct Layout {
    x: Vec<f64>,
    y: Vec<f64>,
}

/// Rectangular cladogram layout: depth sets x, leaf order sets y, an
/// internal node's y is the midpoint of its children's.
fn layout(tree: &Tree, root: NodeId, width: f64, height: f64) -> Layout {
    let n = tree.len().max(1);
    let mut x = vec![0.0; n];
    let mut y = vec![0.0; n];

    let leaves = tree.get_leaves();
    let dy = if leaves.len() > 1 { height / (leaves.len() - 1) as f64 } else { 0.0 };
    for (i, &leaf) in leaves.iter().enumerate() {
        y[leaf] = i as f64 * dy;
    }

    fn depth_of(tree: &Tree, id: NodeId, root: NodeId) -> usize {
        let mut d = 0;
        let mut cur = id;
        while cur != root {
            match tree.get_node(cur).and_then(|n| n.parent) {
                Some(p) => {
                    cur = p;
                    d += 1;
                }
                None => break,
            }
        }
        d
    }
    let max_depth = tree.preorder(root).iter().map(|&id| depth_of(tree, id, root)).max().unwrap_or(0).max(1);
    let dx = width / max_depth as f64;
    for id in tree.preorder(root) {
        x[id] = depth_of(tree, id, root) as f64 * dx;
    }

    for id in tree.postorder(root) {
        let node = tree.get_node(id).unwrap();
        if !node.children.is_empty() {
            let avg = node.children.iter().map(|&c| y[c]).sum::<f64>() / node.children.len() as f64;
            y[id] = avg;
        }
    }

    Layout { x, y }
}

/// Single-page A4 PostScript rendering (spec §6 `-p`), with a 1-inch
/// margin. Mirrors the teacher repo's `PostscriptPort` header/footer
/// and `DrawLine`/`DrawText` procedure definitions.
pub fn write_postscript(tree: &Tree, title: &str) -> String {
    const PAGE_W: f64 = 595.0;
    const PAGE_H: f64 = 842.0;
    const MARGIN: f64 = 72.0;
    let draw_w = PAGE_W - 2.0 * MARGIN;
    let draw_h = PAGE_H - 2.0 * MARGIN;

    let mut s = String::new();
    s.push_str("%!PS-Adobe-2.0\n");
    s.push_str("%%Creator: mcst\n");
    s.push_str("%%DocumentFonts: Times-Roman\n");
    s.push_str(&format!("%%Title: {}\n", title));
    s.push_str("%%BoundingBox: 0 0 595 842\n");
    s.push_str("%%Pages: 1\n");
    s.push_str("%%EndComments\n\n");
    s.push_str("0 842 translate\n");
    s.push_str("72 -72 translate\n\n");
    s.push_str("% arguments x1 y1 x2 y2 width\n/DrawLine {\n   gsave\n   setlinewidth\n   0 setgray\n   moveto\n   lineto\n   stroke\n   grestore\n   } bind def\n\n");
    s.push_str("% arguments x y text\n/DrawText {\n  gsave 1 setlinewidth 0 setgray\n  moveto\n  show grestore\n} bind def\n\n");
    s.push_str("/Times-Roman findfont\n10 scalefont\nsetfont\n\n");

    if let Some(root) = tree.get_root() {
        let layout = layout(tree, root, draw_w - 60.0, draw_h);
        for id in tree.preorder(root) {
            let node = tree.get_node(id).unwrap();
            for &child in &node.children {
                s.push_str(&format!(
                    "{} {} {} {} 1 DrawLine\n",
                    layout.x[child], -layout.y[child], layout.x[id], -layout.y[id]
                ));
            }
            if let Some(name) = &node.name {
                s.push_str(&format!("({}) {} {} DrawText\n", name, layout.x[id] + 4.0, -layout.y[id]));
            }
        }
    }

    s.push_str("\nshowpage\n%%Trailer\n%%end\n%%EOF\n");
    s
}

/// Reformat a supertree's internal labels so every leaf carries its
/// human-readable label instead of the global `LabelId`'s `c<N>`-style
/// internal name — used by the `-l` flag on graph dumps. Leaf names are
/// already human-readable; this only matters for callers that built the
/// tree from label indices directly.
pub fn humanize_leaf_names(tree: &mut Tree, labels: &LabelTable) {
    for id in 0..tree.len() {
        if let Some(node) = tree.get_node_mut(id) {
            if node.children.is_empty() {
                if let Some(name) = &node.name {
                    if let Ok(idx) = name.parse::<u32>() {
                        if (idx as usize) < labels.len() {
                            node.name = Some(labels.name(crate::libs::supertree::label::LabelId(idx)).to_string());
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::supertree::node::Node;

    fn sample() -> Tree {
        let mut t = Tree::new();
        let root = t.add_node();
        let a = t.add_node();
        let b = t.add_node();
        *t.get_node_mut(a).unwrap() = Node::new(a).with_name("A");
        *t.get_node_mut(b).unwrap() = Node::new(b).with_name("B");
        t.add_child(root, a).unwrap();
        t.add_child(root, b).unwrap();
        t.set_root(root);
        t.get_node_mut(root).unwrap().name = Some("c1".to_string());
        t.update();
        t
    }

    #[test]
    fn writes_compact_newick() {
        assert_eq!(write_newick(&sample()), "(A,B)c1;");
    }

    #[test]
    fn writes_a_nexus_trees_block() {
        let nexus = write_nexus(&sample(), "supertree");
        assert!(nexus.starts_with("#nexus"));
        assert!(nexus.contains("begin trees;"));
        assert!(nexus.contains("(A,B)c1;"));
    }

    #[test]
    fn writes_dot_with_every_node() {
        let dot = write_dot(&sample());
        assert!(dot.contains("digraph Tree {"));
        assert!(dot.contains("label=\"A\""));
    }

    #[test]
    fn writes_postscript_header_and_footer() {
        let ps = write_postscript(&sample(), "test");
        assert!(ps.starts_with("%!PS-Adobe-2.0"));
        assert!(ps.trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn writes_stgraph_gml_and_dot_with_human_labels() {
        let mut labels = LabelTable::new();
        let a = labels.intern("A");
        let b = labels.intern("B");
        let mut st = StGraph::new();
        st.add_node(a);
        st.add_node(b);
        st.add_edge(a, b, 2);

        let gml = write_stgraph_gml(&st, &labels, true);
        assert!(gml.starts_with("graph ["));
        assert!(gml.contains("label \"A\""));

        let dot = write_stgraph_dot(&st, &labels, false);
        assert!(dot.starts_with("graph ST {"));
        assert!(dot.contains("-- "));
    }
}
