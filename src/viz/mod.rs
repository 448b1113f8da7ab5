use std::fmt::Write;

use crate::tree::{NodeId, Tree};

/// Renders the tree as a Graphviz digraph with record-shaped nodes: each
/// value gets its own cell and each child hangs off the port between the
/// cells that bracket its key range. Walks the tree read-only, pre-order.
pub fn to_dot(tree: &Tree) -> String {
    if tree.is_empty() {
        return String::from("digraph g { }\n");
    }

    let mut nodes = String::new();
    let mut edges = String::new();
    walk(tree, tree.root(), &mut nodes, &mut edges);

    format!("digraph g {{\n    node [shape = record, height = .1];\n{nodes}{edges}}}\n")
}

fn walk(tree: &Tree, id: NodeId, nodes: &mut String, edges: &mut String) {
    let node = tree.node(id);

    let mut label = String::new();
    for (i, value) in node.values().iter().enumerate() {
        write!(label, "<f{i}> | {value} | ").expect("writing to a String cannot fail");
    }
    write!(label, "<f{}>", node.values().len()).expect("writing to a String cannot fail");
    writeln!(nodes, "    node{id} [label = \"{label}\"];")
        .expect("writing to a String cannot fail");

    for (i, &child) in node.children().iter().enumerate() {
        writeln!(edges, "    \"node{id}\":f{i} -> \"node{child}\";")
            .expect("writing to a String cannot fail");
    }

    for &child in node.children() {
        walk(tree, child, nodes, edges);
    }
}
