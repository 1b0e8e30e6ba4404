//! The shift/reduce stack that turns pushed items into a tree.
//!
//! Handlers push [`StackItem`]s; the item on top decides through
//! [`StackItem::check_item`] whether the newcomer is stacked on it, consumed by
//! it, or makes it reduce. Reductions can cascade: a replacement item is
//! offered to the new top exactly like a freshly pushed one.

mod array;
mod item;

pub use array::ArrayState;
pub use item::{APPLY_FUNCTION, CheckResult, ItemKind, ItemReducer, Properties, StackItem, fenced};

use log::trace;

use crate::registry::Configuration;
use crate::tags::TagManager;
use crate::types::ParseError;

/// What reductions may consult or update while items are pushed.
#[derive(Debug)]
pub struct Reduce<'a> {
    /// Text being scanned.
    pub text: &'a str,
    /// Offset of the command being dispatched.
    pub start: usize,
    /// Scanner position.
    pub pos: usize,
    /// Numbering state of the current top-level parse.
    pub tags: &'a mut TagManager,
}

impl Reduce<'_> {
    /// Trimmed source between two offsets, if there is any.
    #[must_use]
    pub fn source(&self, from: usize, to: usize) -> Option<String> {
        self.text
            .get(from..to)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    }
}

/// The parse stack.
#[derive(Debug, Default)]
pub struct Stack {
    items: Vec<StackItem>,
}

impl Stack {
    /// A stack holding `base`.
    #[must_use]
    pub fn new(base: StackItem) -> Self {
        Self { items: vec![base] }
    }

    /// Offers `item` to the top item, stacking it or reducing as told.
    pub fn push(&mut self, item: StackItem, cx: &mut Reduce<'_>) -> Result<(), ParseError> {
        let Some(top) = self.items.last_mut() else {
            self.items.push(item);
            return Ok(());
        };
        let top_kind = top.kind_name().to_owned();
        match top.check_item(item, cx)? {
            CheckResult::Push(mut item) => {
                trace!("push {} onto {top_kind}", item.kind_name());
                item.env = top.env;
                self.items.push(item);
            }
            CheckResult::Absorb => {}
            CheckResult::Replace(items) => {
                trace!("reduce {top_kind} into {} item(s)", items.len());
                self.items.pop();
                for item in items {
                    self.push(item, cx)?;
                }
            }
            CheckResult::NotApplicable(item) => {
                // check_item resolves this through the default rule
                self.items.push(item);
            }
        }
        Ok(())
    }

    /// The item on top.
    #[must_use]
    pub fn top(&self) -> Option<&StackItem> {
        self.items.last()
    }

    /// The item on top, mutably.
    pub fn top_mut(&mut self) -> Option<&mut StackItem> {
        self.items.last_mut()
    }

    /// Removes the top item.
    pub fn pop(&mut self) -> Option<StackItem> {
        self.items.pop()
    }

    /// Removes the last finished node of the top item.
    pub fn prev(&mut self) -> Option<crate::node::MmlNode> {
        self.top_mut().and_then(|top| top.nodes.pop())
    }

    /// Number of stacked items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is stacked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Builds stack items by kind name: the built-in kinds that need no
/// parameters, then whatever the packages of a configuration contribute.
#[derive(Debug, Clone, Copy)]
pub struct StackItemFactory<'a> {
    config: &'a Configuration,
}

impl<'a> StackItemFactory<'a> {
    /// A factory backed by `config`.
    #[must_use]
    pub const fn new(config: &'a Configuration) -> Self {
        Self { config }
    }

    /// A fresh item of kind `kind`.
    pub fn create(&self, kind: &str) -> Result<StackItem, ParseError> {
        let kind = match kind {
            "start" => ItemKind::Start { inner: false },
            "stop" => ItemKind::Stop,
            "open" => ItemKind::Open,
            "close" => ItemKind::Close,
            "prime" => ItemKind::Prime,
            "fn" => ItemKind::Fn,
            "not" => ItemKind::Not,
            "begingroup" => ItemKind::BeginGroup,
            "endgroup" => ItemKind::EndGroup,
            other => return self.config.create_item(other),
        };
        Ok(StackItem::new(kind))
    }
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::*;
    use crate::node::{MmlNode, NodeKind};
    use crate::tags::{TagManager, no_tags};
    use crate::types::{ScriptPosition, Settings};

    fn tags() -> TagManager {
        TagManager::new(Arc::from(no_tags()), &Settings::default())
    }

    fn mi(text: &str) -> StackItem {
        StackItem::mml(MmlNode::token(NodeKind::Mi, text))
    }

    fn finish(mut stack: Stack, cx: &mut Reduce<'_>) -> Result<MmlNode, ParseError> {
        stack.push(StackItem::new(ItemKind::Stop), cx)?;
        assert_eq!(stack.len(), 1);
        let mut top = stack.pop().unwrap();
        assert!(top.is_final());
        Ok(top.nodes.pop().unwrap())
    }

    #[test]
    fn test_nodes_accumulate_into_row() {
        let mut tags = tags();
        let mut cx = Reduce { text: "xy", start: 0, pos: 2, tags: &mut tags };
        let mut stack = Stack::new(StackItem::new(ItemKind::Start { inner: true }));
        stack.push(mi("x"), &mut cx).unwrap();
        stack.push(mi("y"), &mut cx).unwrap();
        let node = finish(stack, &mut cx).unwrap();
        assert_eq!(node.kind, NodeKind::Mrow);
        assert!(node.inferred);
        assert_eq!(node.children.len(), 2);
    }

    #[test]
    fn test_braces_reduce_to_atom() {
        let mut tags = tags();
        let mut cx = Reduce { text: "{x}", start: 0, pos: 3, tags: &mut tags };
        let mut stack = Stack::new(StackItem::new(ItemKind::Start { inner: true }));
        stack.push(StackItem::new(ItemKind::Open), &mut cx).unwrap();
        assert_eq!(stack.len(), 2);
        stack.push(mi("x"), &mut cx).unwrap();
        stack.push(StackItem::new(ItemKind::Close), &mut cx).unwrap();
        let node = finish(stack, &mut cx).unwrap();
        assert_eq!(node.kind, NodeKind::TeXAtom);
        assert_eq!(node.provenance.as_deref(), Some("{x}"));
    }

    #[test]
    fn test_unbalanced_items_error() {
        let mut tags = tags();
        let mut cx = Reduce { text: "", start: 0, pos: 0, tags: &mut tags };
        let mut stack = Stack::new(StackItem::new(ItemKind::Start { inner: true }));
        let err = stack
            .push(StackItem::new(ItemKind::Close), &mut cx)
            .unwrap_err();
        assert_eq!(err.id(), "ExtraCloseMissingOpen");

        let mut stack = Stack::new(StackItem::new(ItemKind::Start { inner: true }));
        stack.push(StackItem::new(ItemKind::Open), &mut cx).unwrap();
        let err = finish(stack, &mut cx).unwrap_err();
        assert_eq!(err.id(), "ExtraOpenMissingClose");
    }

    #[test]
    fn test_subscript_fills_its_slot() {
        let mut tags = tags();
        let mut cx = Reduce { text: "", start: 0, pos: 0, tags: &mut tags };
        let mut stack = Stack::new(StackItem::new(ItemKind::Start { inner: true }));
        let script = MmlNode::with_children(
            NodeKind::Msubsup,
            vec![
                MmlNode::token(NodeKind::Mi, "a"),
                MmlNode::placeholder(),
                MmlNode::placeholder(),
            ],
        );
        let item = StackItem::new(ItemKind::SubSup {
            position: ScriptPosition::Sub,
            primes: None,
        })
        .with_nodes(vec![script]);
        stack.push(item, &mut cx).unwrap();
        stack.push(mi("i"), &mut cx).unwrap();
        let node = finish(stack, &mut cx).unwrap();
        assert_eq!(node.kind, NodeKind::Msubsup);
        assert_eq!(node.children[1].text(), "i");
        assert!(node.children[2].is_placeholder());
    }

    #[test]
    fn test_fn_inserts_apply_function() {
        let mut tags = tags();
        let mut cx = Reduce { text: "", start: 0, pos: 0, tags: &mut tags };
        let mut stack = Stack::new(StackItem::new(ItemKind::Start { inner: true }));
        let item = StackItem::new(ItemKind::Fn).with_nodes(vec![MmlNode::token(NodeKind::Mi, "sin")]);
        stack.push(item, &mut cx).unwrap();
        stack.push(mi("x"), &mut cx).unwrap();
        let node = finish(stack, &mut cx).unwrap();
        let texts: Vec<&str> = node.children.iter().map(MmlNode::text).collect();
        assert_eq!(texts, ["sin", APPLY_FUNCTION, "x"]);
    }

    #[test]
    fn test_fn_before_fn_has_no_apply_function() {
        let mut tags = tags();
        let mut cx = Reduce { text: "", start: 0, pos: 0, tags: &mut tags };
        let mut stack = Stack::new(StackItem::new(ItemKind::Start { inner: true }));
        for name in ["sin", "cos"] {
            let item = StackItem::new(ItemKind::Fn).with_nodes(vec![MmlNode::token(NodeKind::Mi, name)]);
            stack.push(item, &mut cx).unwrap();
        }
        stack.push(mi("x"), &mut cx).unwrap();
        let node = finish(stack, &mut cx).unwrap();
        let texts: Vec<&str> = node.children.iter().map(MmlNode::text).collect();
        assert_eq!(texts, ["sin", "cos", APPLY_FUNCTION, "x"]);
    }

    #[test]
    fn test_style_hands_its_content_to_over() {
        let mut tags = tags();
        let mut cx = Reduce { text: "", start: 0, pos: 0, tags: &mut tags };
        let mut stack = Stack::new(StackItem::new(ItemKind::Start { inner: true }));
        stack
            .push(
                StackItem::new(ItemKind::Style {
                    attrs: vec![("displaystyle".to_owned(), "true".to_owned())],
                }),
                &mut cx,
            )
            .unwrap();
        stack.push(mi("a"), &mut cx).unwrap();
        stack
            .push(
                StackItem::new(ItemKind::Over {
                    name: "\\over".to_owned(),
                    num: None,
                    thickness: None,
                    open: String::new(),
                    close: String::new(),
                    num_start: 0,
                }),
                &mut cx,
            )
            .unwrap();
        stack.push(mi("b"), &mut cx).unwrap();
        let node = finish(stack, &mut cx).unwrap();
        assert_eq!(node.kind, NodeKind::Mstyle);
        let frac = &node.children[0];
        assert_eq!(frac.kind, NodeKind::Mfrac);
        assert_eq!(frac.children[0].text(), "a");
        assert_eq!(frac.children[1].text(), "b");
    }

    #[test]
    fn test_second_over_is_ambiguous() {
        let mut tags = tags();
        let mut cx = Reduce { text: "", start: 0, pos: 0, tags: &mut tags };
        let over = || {
            StackItem::new(ItemKind::Over {
                name: "\\over".to_owned(),
                num: None,
                thickness: None,
                open: String::new(),
                close: String::new(),
                num_start: 0,
            })
        };
        let mut stack = Stack::new(StackItem::new(ItemKind::Start { inner: true }));
        stack.push(mi("a"), &mut cx).unwrap();
        stack.push(over(), &mut cx).unwrap();
        stack.push(mi("b"), &mut cx).unwrap();
        let err = stack.push(over(), &mut cx).unwrap_err();
        assert_eq!(err.id(), "AmbiguousUseOf");
    }

    #[test]
    fn test_extension_item_uses_its_reducer() {
        fn swallow(
            top: &mut StackItem,
            item: StackItem,
            _: &mut Reduce<'_>,
        ) -> Result<CheckResult, ParseError> {
            if item.is_close() {
                let count = top.nodes.len().to_string();
                return Ok(CheckResult::Replace(vec![
                    StackItem::mml(MmlNode::token(NodeKind::Mn, count)),
                    item,
                ]));
            }
            Ok(CheckResult::NotApplicable(item))
        }
        let mut tags = tags();
        let mut cx = Reduce { text: "", start: 0, pos: 0, tags: &mut tags };
        let mut stack = Stack::new(StackItem::new(ItemKind::Start { inner: true }));
        stack
            .push(
                StackItem::new(ItemKind::Extension {
                    name: "count".to_owned(),
                    reducer: swallow,
                }),
                &mut cx,
            )
            .unwrap();
        stack.push(mi("a"), &mut cx).unwrap();
        stack.push(mi("b"), &mut cx).unwrap();
        let node = finish(stack, &mut cx).unwrap();
        assert_eq!(node.kind, NodeKind::Mn);
        assert_eq!(node.text(), "2");
    }
}
