//! Indented text dump of a bracket
//!
//! Each depth adds `...`. Leaves print as ` name: residual`; matches open
//! with `{` and close with `}residual`.

use std::fmt::{self, Write};

use crate::node::{NodeId, NodeKind};
use crate::tree::BracketTree;

const INDENT: &str = "...";

/// Render the whole bracket
pub fn render(tree: &BracketTree) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_node(&mut out, tree, tree.root(), 0);
    out
}

fn write_node(out: &mut impl Write, tree: &BracketTree, id: NodeId, depth: usize) -> fmt::Result {
    let indent = INDENT.repeat(depth);
    match tree.get(id).kind() {
        NodeKind::Leaf(entry) => {
            writeln!(out, "{} {}: {}", indent, entry.name, tree.residual(id))
        }
        NodeKind::Branch { left, right } => {
            writeln!(out, "{}{{", indent)?;
            write_node(out, tree, *left, depth + 1)?;
            write_node(out, tree, *right, depth + 1)?;
            writeln!(out, "{}}}{}", indent, tree.residual(id))
        }
    }
}

impl fmt::Display for BracketTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self, self.root(), 0)
    }
}
