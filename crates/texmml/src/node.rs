//! The tree handed to downstream renderers.
//!
//! Nodes mirror MathML presentation elements. Each node carries the verbatim
//! markup it was built from (its *provenance*) so that a renderer or a
//! diagnostic can point back at the source.

use alloc::collections::BTreeMap;
use core::fmt;

use strum::{AsRefStr, Display, EnumString};

use crate::types::TexClass;

/// Kind tag of an [`MmlNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[allow(missing_docs)]
pub enum NodeKind {
    Math,
    Mrow,
    Mi,
    Mn,
    Mo,
    Mtext,
    Mspace,
    Mfrac,
    Msqrt,
    Mroot,
    Msub,
    Msup,
    Msubsup,
    Munder,
    Mover,
    Munderover,
    Mtable,
    Mtr,
    Mlabeledtr,
    Mtd,
    Mstyle,
    Mpadded,
    Mphantom,
    Menclose,
    #[strum(serialize = "TeXAtom")]
    TeXAtom,
    /// An empty child slot, e.g. the missing script of a half-built
    /// `msubsup`. Removed by the `clean_subsup` post filter.
    None,
}

impl NodeKind {
    /// Token elements hold text instead of children.
    #[must_use]
    pub const fn is_token(self) -> bool {
        matches!(
            self,
            Self::Mi | Self::Mn | Self::Mo | Self::Mtext | Self::Mspace
        )
    }

    /// Elements that script their first child.
    #[must_use]
    pub const fn is_script(self) -> bool {
        matches!(
            self,
            Self::Msub | Self::Msup | Self::Msubsup | Self::Munder | Self::Mover | Self::Munderover
        )
    }
}

/// A node of the output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MmlNode {
    /// Element kind.
    pub kind: NodeKind,
    /// Text content of token elements.
    pub text: Option<String>,
    /// Ordered children.
    pub children: Vec<MmlNode>,
    /// Attribute table, ordered by name.
    pub attributes: BTreeMap<String, String>,
    /// Explicit TeX spacing class, when one was assigned.
    pub tex_class: Option<TexClass>,
    /// Verbatim markup this node was parsed from.
    pub provenance: Option<String>,
    /// Set on rows the parser made up to hold several nodes. Such rows are
    /// dissolved into their parent when pushed.
    pub inferred: bool,
}

impl MmlNode {
    /// A node with no content.
    #[must_use]
    pub const fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            text: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            tex_class: None,
            provenance: None,
            inferred: false,
        }
    }

    /// A token element holding `text`.
    #[must_use]
    pub fn token<S: Into<String>>(kind: NodeKind, text: S) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(kind)
        }
    }

    /// A container element.
    #[must_use]
    pub fn with_children(kind: NodeKind, children: Vec<Self>) -> Self {
        Self {
            children,
            ..Self::new(kind)
        }
    }

    /// Placeholder for an empty child slot.
    #[must_use]
    pub const fn placeholder() -> Self {
        Self::new(NodeKind::None)
    }

    /// Wrap `nodes` as a single node: a lone node is returned as is, anything
    /// else becomes a row, marked inferred when `inferred` is set.
    #[must_use]
    pub fn row(mut nodes: Vec<Self>, inferred: bool) -> Self {
        if nodes.len() == 1
            && let Some(node) = nodes.pop()
        {
            return node;
        }
        Self {
            inferred,
            ..Self::with_children(NodeKind::Mrow, nodes)
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn attr<S: Into<String>>(mut self, name: &str, value: S) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style TeX class setter.
    #[must_use]
    pub const fn class(mut self, tex_class: TexClass) -> Self {
        self.tex_class = Some(tex_class);
        self
    }

    /// Set an attribute.
    pub fn set_attr<S: Into<String>>(&mut self, name: &str, value: S) {
        self.attributes.insert(name.to_owned(), value.into());
    }

    /// Look up an attribute.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether this is the empty-slot placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.kind == NodeKind::None
    }

    /// Child at `index`, skipping placeholders.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Self> {
        self.children.get(index).filter(|c| !c.is_placeholder())
    }

    /// Text of a token element, or the empty string.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// The spacing class, falling back to the natural class of the kind.
    #[must_use]
    pub fn effective_class(&self) -> TexClass {
        self.tex_class.unwrap_or(match self.kind {
            NodeKind::Mo => TexClass::Rel,
            _ => TexClass::Ord,
        })
    }

    /// The operator at the core of an embellished operator: an `mo`, or a
    /// script, fraction or row whose first child is embellished.
    #[must_use]
    pub fn core_mo(&self) -> Option<&Self> {
        match self.kind {
            NodeKind::Mo => Some(self),
            NodeKind::Mfrac | NodeKind::Mstyle | NodeKind::Mpadded | NodeKind::Mphantom => {
                self.children.first().and_then(Self::core_mo)
            }
            kind if kind.is_script() => self.children.first().and_then(Self::core_mo),
            NodeKind::Mrow | NodeKind::TeXAtom if self.children.len() == 1 => {
                self.children.first().and_then(Self::core_mo)
            }
            _ => None,
        }
    }

    /// Whether this node is an embellished operator.
    #[must_use]
    pub fn is_embellished(&self) -> bool {
        self.core_mo().is_some()
    }

    /// Depth-first visit of this node and all descendants.
    pub fn walk<F: FnMut(&Self)>(&self, f: &mut F) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Depth-first mutable visit, children before parents.
    pub fn walk_mut<F: FnMut(&mut Self)>(&mut self, f: &mut F) {
        for child in &mut self.children {
            child.walk_mut(f);
        }
        f(self);
    }
}

/// Serializes the tree as MathML-like markup (without provenance), mostly
/// for diagnostics and tests.
impl fmt::Display for MmlNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_placeholder() {
            return write!(f, "<none/>");
        }
        write!(f, "<{}", self.kind)?;
        if let Some(class) = self.tex_class {
            write!(f, " texClass=\"{class}\"")?;
        }
        for (name, value) in &self.attributes {
            write!(f, " {name}=\"{value}\"")?;
        }
        write!(f, ">")?;
        if let Some(text) = &self.text {
            write!(f, "{text}")?;
        }
        for child in &self.children {
            write!(f, "{child}")?;
        }
        write!(f, "</{}>", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_unwraps_single_node() {
        let node = MmlNode::row(vec![MmlNode::token(NodeKind::Mi, "x")], true);
        assert_eq!(node.kind, NodeKind::Mi);
        let row = MmlNode::row(
            vec![
                MmlNode::token(NodeKind::Mi, "x"),
                MmlNode::token(NodeKind::Mi, "y"),
            ],
            true,
        );
        assert_eq!(row.kind, NodeKind::Mrow);
        assert!(row.inferred);
    }

    #[test]
    fn test_embellished_operator() {
        let sum = MmlNode::token(NodeKind::Mo, "\u{2211}");
        let scripted = MmlNode::with_children(
            NodeKind::Msub,
            vec![sum, MmlNode::token(NodeKind::Mi, "i")],
        );
        assert!(scripted.is_embellished());
        assert!(!MmlNode::token(NodeKind::Mi, "x").is_embellished());
    }

    #[test]
    fn test_display() {
        let node = MmlNode::with_children(
            NodeKind::Mfrac,
            vec![
                MmlNode::token(NodeKind::Mn, "1"),
                MmlNode::token(NodeKind::Mn, "2"),
            ],
        )
        .attr("linethickness", "0");
        assert_eq!(
            node.to_string(),
            "<mfrac linethickness=\"0\"><mn>1</mn><mn>2</mn></mfrac>"
        );
    }
}
