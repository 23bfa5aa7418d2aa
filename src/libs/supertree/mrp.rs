use crate::libs::supertree::label::{LabelId, LabelTable};
use crate::libs::supertree::tree::Tree;
use std::collections::BTreeSet;

/// One MRP (matrix representation with parsimony) character: the clade
/// it encodes, plus the set of taxa its source tree actually has an
/// opinion about (everything else is scored missing).
struct Character {
    clade: BTreeSet<LabelId>,
    scope: BTreeSet<LabelId>,
}

/// spec §6 `-m`: build an MRP matrix instead of computing a supertree.
/// One binary character per non-trivial clade of every source tree,
/// taxa outside that tree's own leaf set scored `?`, plus a synthetic
/// all-zero `mrp_outgroup` row used to root parsimony analyses of the
/// resulting matrix.
pub struct MrpMatrix {
    pub taxa: Vec<String>,
    /// `rows[i][j]` is the symbol for taxon `i` at character `j`.
    pub rows: Vec<Vec<char>>,
    /// 1-based, inclusive `(start, end)` character range contributed by
    /// each source tree, in input order, for the output sets block.
    pub tree_ranges: Vec<(usize, usize)>,
}

fn collect_characters(tree: &Tree) -> Vec<Character> {
    let mut chars = Vec::new();
    let root = match tree.get_root() {
        Some(r) => r,
        None => return chars,
    };
    let scope: BTreeSet<LabelId> = match tree.label_cluster(root) {
        Some(c) => c.clone(),
        None => return chars,
    };
    if scope.len() < 4 {
        // Fewer than 4 taxa: no internal edge can be non-trivial.
        return chars;
    }
    for id in tree.preorder(root) {
        if id == root {
            continue;
        }
        if tree.get_node(id).map(|n| n.is_leaf()).unwrap_or(true) {
            continue;
        }
        let clade = match tree.label_cluster(id) {
            Some(c) => c.clone(),
            None => continue,
        };
        if clade.len() < 2 || clade.len() >= scope.len() {
            continue;
        }
        chars.push(Character { clade, scope: scope.clone() });
    }
    chars
}

pub fn build_mrp_matrix(trees: &[Tree], labels: &LabelTable) -> MrpMatrix {
    let taxa: Vec<String> = labels.iter().map(|(_, name)| name.to_string()).collect();
    let taxon_ids: Vec<LabelId> = labels.iter().map(|(id, _)| id).collect();

    let mut all_characters = Vec::new();
    let mut tree_ranges = Vec::new();
    for t in trees {
        let chars = collect_characters(t);
        let start = all_characters.len() + 1;
        all_characters.extend(chars);
        let end = all_characters.len();
        tree_ranges.push((start, end));
    }

    let mut rows: Vec<Vec<char>> = taxon_ids
        .iter()
        .map(|&tid| {
            all_characters
                .iter()
                .map(|c| {
                    if c.clade.contains(&tid) {
                        '1'
                    } else if c.scope.contains(&tid) {
                        '0'
                    } else {
                        '?'
                    }
                })
                .collect()
        })
        .collect();

    let outgroup_row = vec!['0'; all_characters.len()];
    rows.push(outgroup_row);
    let mut taxa = taxa;
    taxa.push("mrp_outgroup".to_string());

    MrpMatrix { taxa, rows, tree_ranges }
}

/// NEXUS serialization: taxa block (including `mrp_outgroup`), a
/// characters block with taxa as matrix rows, and a sets block naming
/// each source tree's contributed character range (spec §6).
pub fn write_mrp_nexus(matrix: &MrpMatrix) -> String {
    let ntax = matrix.taxa.len();
    let nchar = matrix.rows.first().map(|r| r.len()).unwrap_or(0);

    let mut s = String::new();
    s.push_str("#nexus\n\n");
    s.push_str("begin taxa;\n");
    s.push_str(&format!(" dimensions ntax={};\n", ntax));
    s.push_str(&format!(" taxlabels {};\n", matrix.taxa.join(" ")));
    s.push_str("end;\n\n");

    s.push_str("begin characters;\n");
    s.push_str(&format!(" dimensions nchar={};\n", nchar));
    s.push_str(" format datatype=standard missing=? gap=-;\n");
    s.push_str(" matrix\n");
    for (name, row) in matrix.taxa.iter().zip(&matrix.rows) {
        let row_str: String = row.iter().collect();
        s.push_str(&format!(" {} {}\n", name, row_str));
    }
    s.push_str(" ;\n");
    s.push_str("end;\n\n");

    s.push_str("begin sets;\n");
    for (i, (start, end)) in matrix.tree_ranges.iter().enumerate() {
        if start > end {
            continue;
        }
        s.push_str(&format!(" charset tree{} = {}-{};\n", i + 1, start, end));
    }
    s.push_str("end;\n");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::supertree::node::Node;

    fn quintet(labels: &mut LabelTable) -> Tree {
        // ((A,B),(C,D),E) — a five-leaf tree with one non-trivial clade
        // on each side, enough to produce two MRP characters.
        let mut t = Tree::new();
        let root = t.add_node();
        let ab = t.add_node();
        let cd = t.add_node();
        let names = ["A", "B", "C", "D", "E"];
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
        t.add_child(root, leaves[4]).unwrap();
        t.set_root(root);
        t.update();
        t.build_label_clusters(labels);
        t
    }

    #[test]
    fn builds_one_character_per_nontrivial_clade() {
        let mut labels = LabelTable::new();
        let t = quintet(&mut labels);
        let matrix = build_mrp_matrix(&[t], &labels);
        assert_eq!(matrix.rows.first().unwrap().len(), 2);
        assert_eq!(matrix.taxa.last().unwrap(), "mrp_outgroup");
    }

    #[test]
    fn outgroup_row_is_all_zero() {
        let mut labels = LabelTable::new();
        let t = quintet(&mut labels);
        let matrix = build_mrp_matrix(&[t], &labels);
        assert!(matrix.rows.last().unwrap().iter().all(|&c| c == '0'));
    }

    #[test]
    fn nexus_output_has_three_blocks() {
        let mut labels = LabelTable::new();
        let t = quintet(&mut labels);
        let matrix = build_mrp_matrix(&[t], &labels);
        let nexus = write_mrp_nexus(&matrix);
        assert!(nexus.contains("begin taxa;"));
        assert!(nexus.contains("begin characters;"));
        assert!(nexus.contains("begin sets;"));
        assert!(nexus.contains("charset tree1 = 1-2;"));
    }
}
