use crate::libs::supertree::error::SupertreeError;
use crate::libs::supertree::label::LabelTable;
use crate::libs::supertree::node::NodeId;
use crate::libs::supertree::tree::Tree;
use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while},
    character::complete::{char, digit1, multispace0},
    combinator::{cut, map, map_res, opt, recognize},
    error::{context, ContextError, ErrorKind, FromExternalError, ParseError},
    multi::{many1, separated_list1},
    sequence::{delimited, preceded},
    IResult, Offset, Parser,
};

#[derive(Clone, Debug, PartialEq)]
enum DetailedErrorKind {
    Context(&'static str),
    Nom(ErrorKind),
}

#[derive(Clone, Debug, PartialEq)]
struct DetailedError<'a> {
    errors: Vec<(&'a str, DetailedErrorKind)>,
}

impl<'a> ParseError<&'a str> for DetailedError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        DetailedError { errors: vec![(input, DetailedErrorKind::Nom(kind))] }
    }
    fn append(input: &'a str, kind: ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Nom(kind)));
        other
    }
}

impl<'a> ContextError<&'a str> for DetailedError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Context(ctx)));
        other
    }
}

impl<'a, E> FromExternalError<&'a str, E> for DetailedError<'a> {
    fn from_external_error(input: &'a str, kind: ErrorKind, _e: E) -> Self {
        DetailedError { errors: vec![(input, DetailedErrorKind::Nom(kind))] }
    }
}

/// Recursive intermediate parse result, converted into the arena-based
/// `Tree` only once the whole subtree has parsed successfully.
struct ParsedNode {
    name: Option<String>,
    length: Option<f64>,
    children: Vec<ParsedNode>,
}

impl ParsedNode {
    fn to_tree(self, tree: &mut Tree) -> NodeId {
        let id = tree.add_node();
        for child in self.children {
            let child_id = child.to_tree(tree);
            tree.add_child(id, child_id).unwrap();
        }
        tree.get_node_mut(id).unwrap().name = self.name;
        tree.get_node_mut(id).unwrap().length = self.length;
        id
    }
}

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn parse_label(input: &str) -> IResult<&str, String, DetailedError<'_>> {
    // Unquoted labels follow Newick convention: a bare underscore stands
    // in for a space, since the grammar has no way to write one literally.
    let unquoted = map(take_while(|c: char| !"():;,[]".contains(c)), |s: &str| {
        s.trim().replace('_', " ")
    });
    let single_quoted = delimited(char('\''), map(is_not("'"), |s: &str| s.replace("''", "'")), char('\''));
    let double_quoted = delimited(char('"'), map(is_not("\""), |s: &str| s.replace("\"\"", "\"")), char('"'));
    context("label", alt((single_quoted, double_quoted, unquoted))).parse(input)
}

fn parse_length(input: &str) -> IResult<&str, f64, DetailedError<'_>> {
    context(
        "length",
        preceded(
            ws(char(':')),
            cut(map_res(
                recognize((
                    opt(char('-')),
                    digit1,
                    opt((char('.'), digit1)),
                    opt((alt((char('e'), char('E'))), opt(alt((char('+'), char('-')))), digit1)),
                )),
                // Negative edge lengths clamp to zero rather than being
                // rejected: malformed upstream data shouldn't fail a parse
                // that would otherwise succeed.
                |s: &str| s.parse::<f64>().map(|n: f64| n.max(0.0)),
            )),
        ),
    )
    .parse(input)
}

/// `[...]` comments are dropped here: `[&W n]`/`[&R]`/`[&U]` annotations
/// are parsed at the tree level (`parse_annotation`), not per-node, per
/// the input grammar (spec §6).
fn parse_comment(input: &str) -> IResult<&str, (), DetailedError<'_>> {
    map(opt(delimited(ws(char('[')), is_not("]"), char(']'))), |_| ()).parse(input)
}

fn parse_subtree(input: &str) -> IResult<&str, ParsedNode, DetailedError<'_>> {
    let (input, children) = context(
        "children",
        opt(delimited(ws(char('(')), separated_list1(ws(char(',')), parse_subtree), ws(char(')')))),
    )
    .parse(input)?;

    let (input, label) = opt(parse_label).parse(input)?;
    let (input, ()) = parse_comment(input)?;
    let (input, length) = opt(parse_length).parse(input)?;
    let (input, ()) = parse_comment(input)?;

    Ok((
        input,
        ParsedNode {
            name: label.filter(|l| !l.is_empty()),
            length,
            children: children.unwrap_or_default(),
        },
    ))
}

/// spec §6 input grammar: `[&W <number>]` sets a tree's weight;
/// `[&R]`/`[&U]` mark it explicitly rooted/unrooted (an unrooted tree is
/// still stored rooted at its written trifurcation — this crate never
/// re-roots on its own).
struct Annotation {
    weight: Option<u32>,
}

fn parse_annotation(input: &str) -> IResult<&str, Annotation, DetailedError<'_>> {
    let mut weight = None;
    let mut rest = input;
    loop {
        let trimmed = rest.trim_start();
        if let Ok((after, tag)) =
            delimited(ws(char::<&str, DetailedError>('[')), is_not("]"), char(']')).parse(trimmed)
        {
            let tag = tag.trim();
            if let Some(n) = tag.strip_prefix("&W").map(|s| s.trim()) {
                weight = n.parse::<u32>().ok();
                rest = after;
                continue;
            }
            if tag == "&R" || tag == "&U" {
                rest = after;
                continue;
            }
            // Not a recognized tree-level tag: leave it for parse_subtree.
            break;
        }
        break;
    }
    Ok((rest, Annotation { weight }))
}

fn make_supertree_error(input: &str, e: DetailedError) -> SupertreeError {
    let (remaining, _) = e.errors.first().unwrap();
    let offset = input.offset(remaining);
    let prefix = &input[..offset];
    let line = prefix.chars().filter(|&c| c == '\n').count() + 1;
    let last_newline = prefix.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let column = offset - last_newline + 1;

    let mut message = String::new();
    for (_, kind) in e.errors.iter().rev() {
        match kind {
            DetailedErrorKind::Context(ctx) => message.push_str(&format!("while parsing {ctx}: ")),
            DetailedErrorKind::Nom(k) => message.push_str(&format!("{k:?} ")),
        }
    }

    SupertreeError::ParseError {
        message: message.trim().to_string(),
        line,
        column,
        snippet: remaining.chars().take(50).collect(),
    }
}

/// Parse one `[&W n][&R] (...);`-shaped tree, interning its leaves into
/// `labels` and building its label clusters.
pub fn parse_tree(input: &str, labels: &mut LabelTable) -> Result<Tree, SupertreeError> {
    let (input, annotation) = parse_annotation(input).map_err(|_| SupertreeError::ParseError {
        message: "malformed tree annotation".to_string(),
        line: 1,
        column: 1,
        snippet: input.chars().take(50).collect(),
    })?;

    let mut parser = (ws(parse_subtree), ws(char(';')));
    match parser.parse(input) {
        Ok((_, (root_node, _))) => {
            let mut tree = Tree::new();
            let root_id = root_node.to_tree(&mut tree);
            tree.set_root(root_id);
            if let Some(w) = annotation.weight {
                tree.weight = w;
            }
            tree.update();
            tree.build_label_clusters(labels);
            Ok(tree)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(make_supertree_error(input, e)),
        Err(nom::Err::Incomplete(_)) => Err(SupertreeError::ParseError {
            message: "incomplete input".to_string(),
            line: 0,
            column: 0,
            snippet: String::new(),
        }),
    }
}

/// Parse every `...;`-terminated tree in `input`, in order. Top-level
/// `[comment]` blocks that are not tree annotations (NEXUS headers,
/// free text) are skipped.
pub fn parse_trees(input: &str, labels: &mut LabelTable) -> Result<Vec<Tree>, SupertreeError> {
    let body = strip_nexus(input);

    fn segment(s: &str) -> Option<&str> {
        let end = s.find(';')?;
        Some(&s[..=end])
    }

    let mut trees = Vec::new();
    let mut rest = body.trim_start();
    while !rest.is_empty() {
        match segment(rest) {
            Some(seg) => {
                let tree = parse_tree(seg, labels)?;
                trees.push(tree);
                rest = rest[seg.len()..].trim_start();
            }
            None => break,
        }
    }
    Ok(trees)
}

/// Reduce a NEXUS `begin trees; ... end;` block to its bare `tree X = ...;`
/// Newick payloads, one per line, concatenated with the rest of the
/// input stripped — resolves the `#nexus` header per spec §6's input
/// grammar. Plain Newick input (no `#nexus` header) passes through
/// unchanged.
fn strip_nexus(input: &str) -> String {
    let trimmed = input.trim_start();
    if !trimmed.to_ascii_lowercase().starts_with("#nexus") {
        return input.to_string();
    }

    let mut out = String::new();
    let lower = input.to_ascii_lowercase();
    if let Some(begin) = lower.find("begin trees") {
        if let Some(end_rel) = lower[begin..].find("end;") {
            let block = &input[begin..begin + end_rel];
            for line in block.lines() {
                let line = line.trim();
                if line.to_ascii_lowercase().starts_with("tree ") {
                    if let Some(eq) = line.find('=') {
                        out.push_str(line[eq + 1..].trim());
                        out.push('\n');
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_tree() {
        let mut labels = LabelTable::new();
        let tree = parse_tree("(A,B)C;", &mut labels).unwrap();
        assert_eq!(tree.leaf_names().len(), 2);
    }

    #[test]
    fn parses_a_weight_annotation() {
        let mut labels = LabelTable::new();
        let tree = parse_tree("[&W 3] (A,B);", &mut labels).unwrap();
        assert_eq!(tree.weight, 3);
    }

    #[test]
    fn parses_a_rootedness_annotation_without_choking() {
        let mut labels = LabelTable::new();
        let tree = parse_tree("[&R] (A,(B,C));", &mut labels).unwrap();
        assert_eq!(tree.leaf_names().len(), 3);
    }

    #[test]
    fn parses_multiple_trees_in_sequence() {
        let mut labels = LabelTable::new();
        let trees = parse_trees("(A,B);\n(C,D);\n", &mut labels).unwrap();
        assert_eq!(trees.len(), 2);
    }

    #[test]
    fn reports_line_and_column_on_missing_semicolon() {
        let mut labels = LabelTable::new();
        let err = parse_tree("(A,B)C", &mut labels).unwrap_err();
        match err {
            SupertreeError::ParseError { line, .. } => assert_eq!(line, 1),
            _ => panic!("expected a parse error"),
        }
    }

    #[test]
    fn unquoted_underscores_become_spaces() {
        let mut labels = LabelTable::new();
        let tree = parse_tree("(Homo_sapiens,B);", &mut labels).unwrap();
        assert!(tree.leaf_names().contains(&"Homo sapiens".to_string()));
    }

    #[test]
    fn negative_edge_lengths_clamp_to_zero() {
        let mut labels = LabelTable::new();
        let tree = parse_tree("(A:-1,B:2);", &mut labels).unwrap();
        let root = tree.get_root().unwrap();
        for &child in &tree.get_node(root).unwrap().children {
            let len = tree.get_node(child).unwrap().length.unwrap();
            assert!(len >= 0.0);
        }
    }

    #[test]
    fn strips_a_nexus_trees_block() {
        let input = "#nexus\nbegin trees;\n  tree one = (A,B);\nend;\n";
        let mut labels = LabelTable::new();
        let trees = parse_trees(input, &mut labels).unwrap();
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].leaf_names().len(), 2);
    }
}
