//! Input and tree filters of the base package.

use crate::node::{MmlNode, NodeKind};
use crate::parser::ParseEnv;
use crate::types::{ScriptPosition, TexClass};

/// Prefix of attributes used for bookkeeping during the parse.
const INTERNAL_PREFIX: &str = "texmml:";

/// Turns `\r\n` and lone `\r` into `\n`.
pub fn normalize_newlines(input: &mut String, _: &ParseEnv) {
    if input.contains('\r') {
        *input = input.replace("\r\n", "\n").replace('\r', "\n");
    }
}

/// Script nodes with an empty slot become the two-child form: `msubsup`
/// turns into `msub` or `msup`, `munderover` into `munder` or `mover`.
pub fn clean_subsup(root: &mut MmlNode, _: &ParseEnv) {
    root.walk_mut(&mut |node| {
        let (sub_kind, sup_kind) = match node.kind {
            NodeKind::Msubsup => (NodeKind::Msub, NodeKind::Msup),
            NodeKind::Munderover => (NodeKind::Munder, NodeKind::Mover),
            _ => return,
        };
        if node.children.len() != 3 {
            return;
        }
        let sub = ScriptPosition::Sub.index();
        let sup = ScriptPosition::Sup.index();
        match (
            node.children[sub].is_placeholder(),
            node.children[sup].is_placeholder(),
        ) {
            (false, false) => {}
            (true, false) => {
                node.children.remove(sub);
                node.kind = sup_kind;
            }
            (false, true) => {
                node.children.remove(sup);
                node.kind = sub_kind;
            }
            (true, true) => {
                node.children.truncate(1);
                if let Some(mut base) = node.children.pop() {
                    if base.provenance.is_none() {
                        base.provenance = node.provenance.take();
                    }
                    *node = base;
                }
            }
        }
    });
}

/// Adjacent relations with the same attributes become one operator, so
/// that `<=` typed as two characters spaces like a single relation.
pub fn combine_relations(root: &mut MmlNode, _: &ParseEnv) {
    root.walk_mut(&mut |node| {
        if node.children.len() < 2 || node.kind.is_token() {
            return;
        }
        let mut merged: Vec<MmlNode> = Vec::with_capacity(node.children.len());
        for child in core::mem::take(&mut node.children) {
            match merged.last_mut() {
                Some(last) if is_relation(last) && is_relation(&child) && same_attributes(last, &child) => {
                    let text = format!("{}{}", last.text(), child.text());
                    last.text = Some(text);
                    last.provenance = match (last.provenance.take(), child.provenance) {
                        (Some(a), Some(b)) => Some(a + &b),
                        (a, b) => a.or(b),
                    };
                }
                _ => merged.push(child),
            }
        }
        node.children = merged;
    });
}

/// Only operators explicitly classed as relations; an unclassed `mo` is
/// left alone.
fn is_relation(node: &MmlNode) -> bool {
    node.kind == NodeKind::Mo && node.tex_class == Some(TexClass::Rel)
}

fn same_attributes(a: &MmlNode, b: &MmlNode) -> bool {
    a.attributes == b.attributes && a.tex_class == b.tex_class
}

/// Drops the bookkeeping attributes from the finished tree.
pub fn clean_attributes(root: &mut MmlNode, _: &ParseEnv) {
    root.walk_mut(&mut |node| {
        node.attributes
            .retain(|name, _| !name.starts_with(INTERNAL_PREFIX));
    });
}
