//! Stack item variants and their reduction rules.

use crate::namespace::KeyMap;
use crate::node::{MmlNode, NodeKind};
use crate::parser::ParseEnv;
use crate::types::{ParseError, ParseErrorKind, ScriptPosition, TexClass};

use super::Reduce;
use super::array::ArrayState;

/// Name/value bag for deferred formatting decisions and package items.
pub type Properties = KeyMap<String, String>;

/// Reduction rule of a package-defined item kind.
pub type ItemReducer =
    fn(top: &mut StackItem, item: StackItem, cx: &mut Reduce<'_>) -> Result<CheckResult, ParseError>;

/// The invisible operator placed between a function name and its argument.
pub const APPLY_FUNCTION: &str = "\u{2061}";

/// Kind of a pending construct, with the state specific to it.
#[derive(Debug, Clone)]
pub enum ItemKind {
    /// Bottom of a (sub-)parse. Inner parses do not number their result.
    Start {
        /// Set for argument and sub-expression parses.
        inner: bool,
    },
    /// End of input.
    Stop,
    /// `{`
    Open,
    /// `}`
    Close,
    /// Primes waiting for what follows; holds `[base, primes]`.
    Prime,
    /// `\left`
    Left {
        /// Opening delimiter text.
        delim: String,
    },
    /// `\middle`
    Middle {
        /// Delimiter text.
        delim: String,
    },
    /// `\right`
    Right {
        /// Closing delimiter text.
        delim: String,
    },
    /// A script slot waiting to be filled. Holds the script node.
    SubSup {
        /// Slot the next finished node goes to.
        position: ScriptPosition,
        /// Primes taken off the base, merged into the superscript.
        primes: Option<MmlNode>,
    },
    /// Generalized fraction: the numerator is taken when this arrives on an
    /// open item, the denominator is everything up to the closing item.
    Over {
        /// Command name, for messages.
        name: String,
        /// Numerator, once taken.
        num: Option<MmlNode>,
        /// `linethickness`, when not the default.
        thickness: Option<String>,
        /// Fencing delimiters.
        open: String,
        /// Fencing delimiters.
        close: String,
        /// Source offset where the numerator starts.
        num_start: usize,
    },
    /// `\begin{name}`
    Begin {
        /// Environment name.
        name: String,
    },
    /// `\end{name}`
    End {
        /// Environment name.
        name: String,
    },
    /// Array-like environment.
    Array(Box<ArrayState>),
    /// Array-like environment whose rows are numbered.
    EqnArray(Box<ArrayState>),
    /// Single numbered formula (`equation`).
    Equation {
        /// Environment name.
        name: String,
    },
    /// Style change up to the end of the group.
    Style {
        /// `mstyle` attributes.
        attrs: Vec<(String, String)>,
    },
    /// Box movement applied to the next finished node.
    Position {
        /// Command name, for messages.
        name: String,
        /// `mpadded` attributes.
        attrs: Vec<(String, String)>,
    },
    /// `&` or `\\`
    Cell {
        /// Command text.
        name: String,
        /// Ends a table entry.
        entry: bool,
        /// Ends a table row.
        cr: bool,
        /// Acceptable (and ignored) outside tables.
        linebreak: bool,
    },
    /// Named function waiting for its argument; holds the name node.
    Fn,
    /// `\not`
    Not,
    /// `\begingroup`
    BeginGroup,
    /// `\endgroup`
    EndGroup,
    /// A finished node.
    Mml,
    /// Package-defined kind.
    Extension {
        /// Kind name.
        name: String,
        /// Reduction rule.
        reducer: ItemReducer,
    },
}

/// Answer of an item to what is pushed onto it.
#[derive(Debug)]
pub enum CheckResult {
    /// Push the incoming item (handed back) on top.
    Push(StackItem),
    /// The incoming item was consumed.
    Absorb,
    /// Pop the checking item and push these, in order.
    Replace(Vec<StackItem>),
    /// No specific rule; the default rule gets the item (handed back).
    NotApplicable(StackItem),
}

/// A pending construct on the parse stack.
#[derive(Debug, Clone)]
pub struct StackItem {
    /// Kind and kind-specific state.
    pub kind: ItemKind,
    /// Collected child nodes.
    pub nodes: Vec<MmlNode>,
    /// Free-form properties.
    pub properties: Properties,
    /// Source offset of the command that created the item.
    pub start: usize,
    /// Source offset right after that command.
    pub content: usize,
    /// Environment in effect inside this item.
    pub env: ParseEnv,
}

impl StackItem {
    /// A fresh item of `kind`.
    #[must_use]
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            properties: Properties::default(),
            start: 0,
            content: 0,
            env: ParseEnv::default(),
        }
    }

    /// A finished node.
    #[must_use]
    pub fn mml(node: MmlNode) -> Self {
        Self::new(ItemKind::Mml).with_nodes(vec![node])
    }

    /// Builder-style node list.
    #[must_use]
    pub fn with_nodes(mut self, nodes: Vec<MmlNode>) -> Self {
        self.nodes = nodes;
        self
    }

    /// Builder-style property.
    #[must_use]
    pub fn with_property(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(name.to_owned(), value.to_owned());
        self
    }

    /// Property lookup.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// First collected node.
    #[must_use]
    pub fn first(&self) -> Option<&MmlNode> {
        self.nodes.first()
    }

    /// Kind name, as used by the item factory and in logs.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        match &self.kind {
            ItemKind::Start { .. } => "start",
            ItemKind::Stop => "stop",
            ItemKind::Open => "open",
            ItemKind::Close => "close",
            ItemKind::Prime => "prime",
            ItemKind::Left { .. } => "left",
            ItemKind::Middle { .. } => "middle",
            ItemKind::Right { .. } => "right",
            ItemKind::SubSup { .. } => "subsup",
            ItemKind::Over { .. } => "over",
            ItemKind::Begin { .. } => "begin",
            ItemKind::End { .. } => "end",
            ItemKind::Array(_) => "array",
            ItemKind::EqnArray(_) => "eqnarray",
            ItemKind::Equation { .. } => "equation",
            ItemKind::Style { .. } => "style",
            ItemKind::Position { .. } => "position",
            ItemKind::Cell { .. } => "cell",
            ItemKind::Fn => "fn",
            ItemKind::Not => "not",
            ItemKind::BeginGroup => "begingroup",
            ItemKind::EndGroup => "endgroup",
            ItemKind::Mml => "mml",
            ItemKind::Extension { name, .. } => name.as_str(),
        }
    }

    /// Items that collect content until something closes them.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Start { .. }
                | ItemKind::Open
                | ItemKind::Left { .. }
                | ItemKind::Begin { .. }
                | ItemKind::BeginGroup
                | ItemKind::Array(_)
                | ItemKind::EqnArray(_)
                | ItemKind::Equation { .. }
        )
    }

    /// Items that close something.
    #[must_use]
    pub const fn is_close(&self) -> bool {
        matches!(
            self.kind,
            ItemKind::Stop
                | ItemKind::Close
                | ItemKind::Right { .. }
                | ItemKind::Middle { .. }
                | ItemKind::End { .. }
                | ItemKind::EndGroup
                | ItemKind::Cell { .. }
        )
    }

    /// Finished nodes.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self.kind, ItemKind::Mml)
    }

    /// Appends a finished node, dissolving inferred rows.
    pub fn push_node(&mut self, node: MmlNode) {
        if node.inferred && node.kind == NodeKind::Mrow {
            self.nodes.extend(node.children);
        } else {
            self.nodes.push(node);
        }
    }

    /// Takes the collected nodes as one node.
    pub fn to_mml(&mut self, inferred: bool) -> MmlNode {
        MmlNode::row(core::mem::take(&mut self.nodes), inferred)
    }

    /// Offers `item` to this item.
    pub fn check_item(&mut self, item: StackItem, cx: &mut Reduce<'_>) -> Result<CheckResult, ParseError> {
        let result = match self.kind {
            ItemKind::Start { inner } => self.check_start(item, inner, cx),
            ItemKind::Open => Ok(self.check_open(item, cx)),
            ItemKind::Prime => Ok(self.check_prime(item, cx)),
            ItemKind::Left { .. } => Ok(self.check_left(item, cx)),
            ItemKind::SubSup { .. } => self.check_subsup(item),
            ItemKind::Over { .. } => self.check_over(item, cx),
            ItemKind::Begin { .. } => self.check_begin(item),
            ItemKind::Array(_) | ItemKind::EqnArray(_) => Ok(self.check_array(item, cx)),
            ItemKind::Equation { .. } => Ok(self.check_equation(item, cx)),
            ItemKind::Style { .. } => Ok(self.check_style(item, cx)),
            ItemKind::Position { .. } => self.check_position(item, cx),
            ItemKind::Fn => Ok(self.check_fn(item)),
            ItemKind::Not => Ok(self.check_not(item)),
            ItemKind::BeginGroup => Ok(self.check_begingroup(item)),
            ItemKind::Extension { reducer, .. } => reducer(self, item, cx),
            _ => Ok(CheckResult::NotApplicable(item)),
        }?;
        match result {
            CheckResult::NotApplicable(item) => self.default_check(item),
            other => Ok(other),
        }
    }

    /// The rule applied when a kind has nothing specific to say.
    fn default_check(&mut self, mut item: StackItem) -> Result<CheckResult, ParseError> {
        if self.is_open()
            && let ItemKind::Over { num, num_start, .. } = &mut item.kind
        {
            *num = Some(self.to_mml(false));
            *num_start = self.content;
        }
        if self.is_open()
            && let ItemKind::Cell {
                name, linebreak, ..
            } = &item.kind
        {
            if *linebreak {
                return Ok(CheckResult::Absorb);
            }
            return Err(ParseError::new(ParseErrorKind::Misplaced { name: name.clone() }));
        }
        if item.is_close()
            && let Some(kind) = self.error_for(&item)
        {
            return Err(ParseError::new(kind));
        }
        if !item.is_final() {
            return Ok(CheckResult::Push(item));
        }
        for node in item.nodes {
            self.push_node(node);
        }
        Ok(CheckResult::Absorb)
    }

    /// Error raised when closing item `item` reaches this item unhandled.
    fn error_for(&self, item: &Self) -> Option<ParseErrorKind> {
        let kind = match (&self.kind, &item.kind) {
            (ItemKind::Open, ItemKind::Stop) => ParseErrorKind::ExtraOpenMissingClose,
            (ItemKind::Left { .. }, ItemKind::Stop) => ParseErrorKind::ExtraLeftMissingRight,
            (ItemKind::Begin { name } | ItemKind::Equation { name }, ItemKind::Stop) => {
                ParseErrorKind::EnvMissingEnd { name: name.clone() }
            }
            (
                ItemKind::BeginGroup,
                ItemKind::Stop | ItemKind::Close | ItemKind::End { .. } | ItemKind::Right { .. },
            ) => ParseErrorKind::MissingEndgroup,
            (ItemKind::SubSup { .. }, ItemKind::Stop) => ParseErrorKind::MissingScript,
            (_, ItemKind::End { name }) => ParseErrorKind::MissingBeginExtraEnd { name: name.clone() },
            (_, ItemKind::Close) => ParseErrorKind::ExtraCloseMissingOpen,
            (_, ItemKind::Right { .. }) => ParseErrorKind::MissingLeftExtraRight,
            (_, ItemKind::Middle { .. }) => ParseErrorKind::ExtraMiddle,
            (_, ItemKind::EndGroup) => ParseErrorKind::ExtraEndMissingBegin {
                name: "\\endgroup".to_owned(),
            },
            _ => return None,
        };
        Some(kind)
    }

    fn check_start(
        &mut self,
        item: StackItem,
        inner: bool,
        cx: &mut Reduce<'_>,
    ) -> Result<CheckResult, ParseError> {
        if !matches!(item.kind, ItemKind::Stop) {
            return Ok(CheckResult::NotApplicable(item));
        }
        let mut node = self.to_mml(true);
        if !inner {
            node = cx.tags.finalize(node, self.env.display);
        }
        if !node.inferred && node.provenance.is_none() {
            node.provenance = cx.source(self.content, cx.pos);
        }
        Ok(CheckResult::Replace(vec![Self::mml(node)]))
    }

    fn check_open(&mut self, item: StackItem, cx: &Reduce<'_>) -> CheckResult {
        if !matches!(item.kind, ItemKind::Close) {
            return CheckResult::NotApplicable(item);
        }
        let mut atom = MmlNode::with_children(NodeKind::TeXAtom, core::mem::take(&mut self.nodes))
            .class(TexClass::Ord);
        atom.provenance = cx.source(self.start, cx.pos);
        CheckResult::Replace(vec![Self::mml(atom)])
    }

    fn check_prime(&mut self, item: StackItem, cx: &Reduce<'_>) -> CheckResult {
        let mut nodes = core::mem::take(&mut self.nodes).into_iter();
        let (Some(mut base), Some(primes)) = (nodes.next(), nodes.next()) else {
            return CheckResult::Replace(vec![item]);
        };
        let mut source = base.provenance.take().unwrap_or_default();
        source.push_str(cx.text.get(self.start..self.content).unwrap_or_default());
        let mut node = if is_script_base(&base) {
            base.children[ScriptPosition::Sup.index()] = primes;
            base
        } else {
            MmlNode::with_children(NodeKind::Msup, vec![base, primes])
        };
        node.provenance = Some(source);
        CheckResult::Replace(vec![Self::mml(node), item])
    }

    fn check_left(&mut self, item: StackItem, cx: &Reduce<'_>) -> CheckResult {
        let ItemKind::Left { delim: open } = &self.kind else {
            return CheckResult::NotApplicable(item);
        };
        match &item.kind {
            ItemKind::Right { delim: close } => {
                let mut node = fenced(open, core::mem::take(&mut self.nodes), close);
                node.provenance = cx.source(self.start, cx.pos);
                CheckResult::Replace(vec![Self::mml(node)])
            }
            ItemKind::Middle { delim } => {
                self.nodes.push(
                    MmlNode::token(NodeKind::Mo, delim.clone())
                        .attr("stretchy", "true")
                        .attr("symmetric", "true"),
                );
                CheckResult::Absorb
            }
            _ => CheckResult::NotApplicable(item),
        }
    }

    fn check_subsup(&mut self, mut item: StackItem) -> Result<CheckResult, ParseError> {
        let ItemKind::SubSup { position, primes } = &mut self.kind else {
            return Ok(CheckResult::NotApplicable(item));
        };
        match item.kind {
            ItemKind::Open | ItemKind::Left { .. } => Ok(CheckResult::Push(item)),
            ItemKind::Mml => {
                let position = *position;
                let primes = primes.take();
                let (Some(mut node), Some(mut script)) = (self.nodes.pop(), item.nodes.pop())
                else {
                    return Err(ParseError::new(ParseErrorKind::MissingScript));
                };
                let script_source = script.provenance.clone().unwrap_or_default();
                if let Some(primes) = primes {
                    if position == ScriptPosition::Sup {
                        script = MmlNode::with_children(NodeKind::Mrow, vec![primes, script]);
                    } else {
                        node.children[ScriptPosition::Sup.index()] = primes;
                    }
                }
                node.children[position.index()] = script;
                let marker = match position {
                    ScriptPosition::Sub => '_',
                    ScriptPosition::Sup => '^',
                };
                let mut source = node.provenance.take().unwrap_or_default();
                source.push(marker);
                source.push_str(&brace(&script_source));
                node.provenance = Some(source);
                Ok(CheckResult::Replace(vec![Self::mml(node)]))
            }
            _ if item.is_close() => Ok(CheckResult::NotApplicable(item)),
            _ => Err(ParseError::new(match position {
                ScriptPosition::Sub => ParseErrorKind::MissingOpenForSub,
                ScriptPosition::Sup => ParseErrorKind::MissingOpenForSup,
            })),
        }
    }

    fn check_over(&mut self, item: StackItem, cx: &Reduce<'_>) -> Result<CheckResult, ParseError> {
        if let ItemKind::Over { name, .. } = &item.kind {
            return Err(ParseError::new(ParseErrorKind::AmbiguousUseOf { name: name.clone() }));
        }
        if !item.is_close() {
            return Ok(CheckResult::NotApplicable(item));
        }
        let den = self.to_mml(false);
        let ItemKind::Over {
            num,
            thickness,
            open,
            close,
            num_start,
            ..
        } = &mut self.kind
        else {
            return Ok(CheckResult::NotApplicable(item));
        };
        let num = num
            .take()
            .unwrap_or_else(|| MmlNode::with_children(NodeKind::Mrow, Vec::new()));
        let mut frac = MmlNode::with_children(NodeKind::Mfrac, vec![num, den]);
        if let Some(thickness) = thickness.take() {
            frac.set_attr("linethickness", thickness);
        }
        let mut node = if open.is_empty() && close.is_empty() {
            frac
        } else {
            fenced(open, vec![frac], close)
        };
        node.provenance = cx.source(*num_start, cx.start);
        Ok(CheckResult::Replace(vec![Self::mml(node), item]))
    }

    fn check_begin(&mut self, item: StackItem) -> Result<CheckResult, ParseError> {
        let (ItemKind::Begin { name: begin }, ItemKind::End { name: end }) = (&self.kind, &item.kind)
        else {
            return Ok(CheckResult::NotApplicable(item));
        };
        if begin != end {
            return Err(ParseError::new(ParseErrorKind::EnvBadEnd {
                begin: begin.clone(),
                end: end.clone(),
            }));
        }
        Ok(CheckResult::Replace(vec![Self::mml(self.to_mml(true))]))
    }

    fn check_array(&mut self, item: StackItem, cx: &mut Reduce<'_>) -> CheckResult {
        if !item.is_close() {
            return CheckResult::NotApplicable(item);
        }
        let numbered = matches!(self.kind, ItemKind::EqnArray(_));
        let nodes = core::mem::take(&mut self.nodes);
        let (ItemKind::Array(state) | ItemKind::EqnArray(state)) = &mut self.kind else {
            return CheckResult::NotApplicable(item);
        };
        if let ItemKind::Cell { entry, cr, .. } = item.kind {
            if entry || cr {
                state.end_entry(nodes);
            }
            if cr {
                let label = if numbered { row_tag(cx) } else { None };
                state.end_row(label);
            }
            return CheckResult::Absorb;
        }
        if state.end_table(nodes) {
            let label = if numbered { row_tag(cx) } else { None };
            state.end_row(label);
        }
        state.check_lines();
        if numbered {
            cx.tags.end();
        }
        let mut node = core::mem::take(state.as_mut()).into_mml();
        node.provenance = cx.source(self.start, cx.pos);
        CheckResult::Replace(vec![Self::mml(node), item])
    }

    fn check_equation(&mut self, item: StackItem, cx: &mut Reduce<'_>) -> CheckResult {
        if !matches!(item.kind, ItemKind::End { .. }) {
            return CheckResult::NotApplicable(item);
        }
        let mut node = self.to_mml(false);
        let tag = cx.tags.get_tag(false);
        cx.tags.end();
        if let Some(tag) = tag {
            node = cx.tags.en_tag(node, tag);
        }
        node.provenance = cx.source(self.start, cx.pos);
        CheckResult::Replace(vec![Self::mml(node), item])
    }

    fn check_style(&mut self, mut item: StackItem, cx: &Reduce<'_>) -> CheckResult {
        // The styled material so far is the numerator of a following \over.
        if let ItemKind::Over { num, num_start, .. } = &mut item.kind {
            *num = Some(self.to_mml(false));
            *num_start = self.content;
            return CheckResult::Push(item);
        }
        if !item.is_close() {
            return CheckResult::NotApplicable(item);
        }
        let ItemKind::Style { attrs } = &self.kind else {
            return CheckResult::NotApplicable(item);
        };
        let mut node = MmlNode::with_children(NodeKind::Mstyle, Vec::new());
        for (name, value) in attrs {
            node.set_attr(name, value.clone());
        }
        node.children = core::mem::take(&mut self.nodes);
        node.provenance = cx.source(self.start, cx.start);
        CheckResult::Replace(vec![Self::mml(node), item])
    }

    fn check_position(&mut self, item: StackItem, cx: &Reduce<'_>) -> Result<CheckResult, ParseError> {
        let ItemKind::Position { name, attrs } = &self.kind else {
            return Ok(CheckResult::NotApplicable(item));
        };
        if item.is_close() {
            return Err(ParseError::new(ParseErrorKind::MissingBoxFor { name: name.clone() }));
        }
        if !item.is_final() {
            return Ok(CheckResult::NotApplicable(item));
        }
        let mut node = MmlNode::with_children(NodeKind::Mpadded, item.nodes);
        for (name, value) in attrs {
            node.set_attr(name, value.clone());
        }
        node.provenance = cx.source(self.start, cx.pos);
        Ok(CheckResult::Replace(vec![Self::mml(node)]))
    }

    fn check_fn(&mut self, item: StackItem) -> CheckResult {
        let Some(name) = self.nodes.first().cloned() else {
            return CheckResult::NotApplicable(item);
        };
        if item.is_open() {
            return CheckResult::Push(item);
        }
        let apply = || Self::mml(MmlNode::token(NodeKind::Mo, APPLY_FUNCTION).class(TexClass::None));
        match &item.kind {
            ItemKind::Mml => {
                let separate = item.first().is_none_or(|node| {
                    node.kind == NodeKind::Mspace
                        || node.is_embellished()
                        || (node.kind == NodeKind::Mstyle
                            && node.children.first().is_some_and(|c| c.kind == NodeKind::Mspace))
                });
                if separate {
                    CheckResult::Replace(vec![Self::mml(name), item])
                } else {
                    CheckResult::Replace(vec![Self::mml(name), apply(), item])
                }
            }
            _ => CheckResult::Replace(vec![Self::mml(name), item]),
        }
    }

    fn check_not(&mut self, mut item: StackItem) -> CheckResult {
        if matches!(item.kind, ItemKind::Open | ItemKind::Left { .. }) {
            return CheckResult::Push(item);
        }
        if item.is_final()
            && let Some(node) = item.nodes.first_mut()
            && matches!(node.kind, NodeKind::Mo | NodeKind::Mi | NodeKind::Mtext)
            && node.text().chars().count() == 1
        {
            let text = node.text();
            let negated = NEGATIONS
                .get(text)
                .map_or_else(|| format!("{text}\u{0338}"), |n| (*n).to_owned());
            node.text = Some(negated);
            return CheckResult::Replace(vec![item]);
        }
        let slash = MmlNode::with_children(
            NodeKind::Mpadded,
            vec![MmlNode::token(NodeKind::Mtext, "\u{29F8}")],
        )
        .attr("width", "0");
        let atom = MmlNode::with_children(NodeKind::TeXAtom, vec![slash]).class(TexClass::Rel);
        CheckResult::Replace(vec![Self::mml(atom), item])
    }

    fn check_begingroup(&mut self, item: StackItem) -> CheckResult {
        if matches!(item.kind, ItemKind::EndGroup) {
            return CheckResult::Replace(vec![Self::mml(self.to_mml(true))]);
        }
        CheckResult::NotApplicable(item)
    }
}

/// Characters with a precomposed negated form.
static NEGATIONS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "<" => "\u{226E}",
    ">" => "\u{226F}",
    "=" => "\u{2260}",
    "\u{2264}" => "\u{2270}",
    "\u{2265}" => "\u{2271}",
    "\u{2208}" => "\u{2209}",
    "\u{220B}" => "\u{220C}",
    "\u{2282}" => "\u{2284}",
    "\u{2283}" => "\u{2285}",
    "\u{2286}" => "\u{2288}",
    "\u{2287}" => "\u{2289}",
    "\u{223C}" => "\u{2241}",
    "\u{2261}" => "\u{2262}",
    "\u{2248}" => "\u{2249}",
    "\u{2223}" => "\u{2224}",
    "\u{2225}" => "\u{2226}",
};

/// Whether `node` is a script node whose superscript slot can still be used.
fn is_script_base(node: &MmlNode) -> bool {
    matches!(node.kind, NodeKind::Msubsup | NodeKind::Munderover)
        && node
            .children
            .get(ScriptPosition::Sup.index())
            .is_some_and(MmlNode::is_placeholder)
}

/// Tag cell for the row being closed, then resets the pending tag.
fn row_tag(cx: &mut Reduce<'_>) -> Option<MmlNode> {
    let tag = cx.tags.get_tag(false);
    cx.tags.clear_tag();
    tag
}

/// Wraps script source in braces unless it is a single token.
fn brace(source: &str) -> String {
    let single = source.chars().count() == 1
        || (source.starts_with('{') && source.ends_with('}'))
        || (source.starts_with('\\') && source[1..].chars().all(|c| c.is_ascii_alphabetic()));
    if single {
        source.to_owned()
    } else {
        format!("{{{source}}}")
    }
}

/// `inner` between stretchy delimiters, as an inner-class row.
#[must_use]
pub fn fenced(open: &str, inner: Vec<MmlNode>, close: &str) -> MmlNode {
    let delim = |text: &str, class| {
        MmlNode::token(NodeKind::Mo, text)
            .attr("fence", "true")
            .attr("stretchy", "true")
            .attr("symmetric", "true")
            .class(class)
    };
    let mut children = Vec::with_capacity(inner.len() + 2);
    children.push(delim(open, TexClass::Open));
    children.extend(inner);
    children.push(delim(close, TexClass::Close));
    MmlNode::with_children(NodeKind::Mrow, children).class(TexClass::Inner)
}
