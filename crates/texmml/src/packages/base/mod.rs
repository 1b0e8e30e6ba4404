//! The base package: characters, symbols, scripts, fractions, fences,
//! fonts, spacing and the grouping primitives.
//!
//! Everything here reaches the engine through [`Package`] like any other
//! package; the parser itself knows no control sequence.

mod commands;
mod filters;
mod symbols;

pub use filters::{clean_attributes, clean_subsup, combine_relations, normalize_newlines};

pub(crate) use commands::contents;

use crate::lexer;
use crate::node::{MmlNode, NodeKind};
use crate::parser::TexParser;
use crate::registry::{
    CharacterHandler, CharacterSpec, DelimiterSpec, HandlerMap, MacroSpec, Package, PostFilter, PreFilter,
    TagPolicyConstructor,
};
use crate::retry::ParseResult;
use crate::stack::{ItemKind, StackItem};
use crate::tags::{all_tags, ams_tags, no_tags};
use crate::types::{ParseErrorKind, ScriptPosition, TexClass};

use symbols::{
    ACCENTS, DELIMITERS, GREEK, LARGE_OPS, NAMED_FUNCTIONS, NAMED_OPERATORS, OPERATOR_CHARS,
    OPERATORS, ORD_IDENTIFIERS, UPPER_GREEK,
};

/// Attribute marking operators whose scripts become limits in display
/// style. Removed by [`clean_attributes`].
pub const MOVESUPSUB: &str = "texmml:movesupsub";

/// Registration name.
pub const NAME: &str = "base";

/// Builds the base package.
#[must_use]
pub fn package() -> Package {
    let spec = |handler: CharacterHandler, class: Option<TexClass>| CharacterSpec {
        handler,
        text: "",
        class,
    };
    let mut named_functions = HandlerMap::new("named-functions");
    for name in &NAMED_FUNCTIONS {
        named_functions.insert(name, MacroSpec::text(commands::named_fn, *name));
    }
    Package {
        // the catch-all map comes first so that it is consulted last
        characters: vec![
            HandlerMap::new("other").with_class(any, spec(operator, None)),
            HandlerMap::from_table("operator-chars", &OPERATOR_CHARS, |(text, class)| {
                CharacterSpec {
                    handler: operator,
                    text,
                    class: Some(class),
                }
            }),
            HandlerMap::new("letters")
                .with_class(lexer::is_letter, spec(letter, None))
                .with_class(char::is_alphabetic, spec(letter, None)),
            HandlerMap::new("digits").with_class(is_digit, spec(digit, None)),
            HandlerMap::new("spaces").with_class(lexer::is_space, spec(skip, None)),
            HandlerMap::new("special")
                .with("\\", spec(control_sequence, None))
                .with("{", spec(open_brace, None))
                .with("}", spec(close_brace, None))
                .with("^", spec(script, None))
                .with("_", spec(script, None))
                .with("'", spec(prime, None))
                .with("&", spec(entry, None))
                .with("~", spec(nbsp, None))
                .with("%", spec(comment, None))
                .with("#", spec(misplaced, None)),
        ],
        macros: vec![
            HandlerMap::from_table("greek", &GREEK, |text| {
                MacroSpec::text(commands::identifier, text)
            }),
            HandlerMap::from_table("upper-greek", &UPPER_GREEK, |text| {
                MacroSpec::text(commands::upright_identifier, text)
            }),
            HandlerMap::from_table("ord-identifiers", &ORD_IDENTIFIERS, |text| {
                MacroSpec::text(commands::identifier, text)
            }),
            HandlerMap::from_table("operators", &OPERATORS, |args| {
                MacroSpec::args(commands::operator, args)
            }),
            HandlerMap::from_table("large-operators", &LARGE_OPS, |args| {
                MacroSpec::args(commands::large_op, args)
            }),
            HandlerMap::from_table("named-operators", &NAMED_OPERATORS, |text| {
                MacroSpec::text(commands::named_op, text)
            }),
            named_functions,
            HandlerMap::from_table("accents", &ACCENTS, |args| {
                MacroSpec::args(commands::accent, args)
            }),
            HandlerMap::from_table("commands", &commands::COMMANDS, |spec| spec),
        ],
        delimiters: vec![HandlerMap::from_table("delimiters", &DELIMITERS, |text| {
            DelimiterSpec { text }
        })],
        pre_filters: vec![(normalize_newlines as PreFilter, 0)],
        post_filters: vec![
            (clean_subsup as PostFilter, 10),
            (combine_relations as PostFilter, 20),
            (clean_attributes as PostFilter, 100),
        ],
        tag_policies: vec![
            ("none".to_owned(), no_tags as TagPolicyConstructor),
            ("ams".to_owned(), ams_tags as TagPolicyConstructor),
            ("all".to_owned(), all_tags as TagPolicyConstructor),
        ],
        protected: ["begingroup", "endgroup", "begin", "end", "global"]
            .into_iter()
            .map(str::to_owned)
            .collect(),
        ..Package::new(NAME, 0)
    }
}

const fn any(_: char) -> bool {
    true
}

const fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn skip(_: &mut TexParser<'_>, _: char, _: &CharacterSpec) -> ParseResult<()> {
    Ok(())
}

fn control_sequence(parser: &mut TexParser<'_>, _: char, _: &CharacterSpec) -> ParseResult<()> {
    parser.control_sequence()
}

fn open_brace(parser: &mut TexParser<'_>, _: char, _: &CharacterSpec) -> ParseResult<()> {
    let open = parser.item("open")?;
    parser.begin_group();
    parser.push(open)
}

fn close_brace(parser: &mut TexParser<'_>, _: char, _: &CharacterSpec) -> ParseResult<()> {
    let close = parser.item("close")?;
    parser.push(close)?;
    parser.end_group()
}

fn letter(parser: &mut TexParser<'_>, c: char, _: &CharacterSpec) -> ParseResult<()> {
    let node = parser.token(NodeKind::Mi, &c.to_string());
    parser.push_node(node)
}

/// A number, or a single digit when it is a script.
fn digit(parser: &mut TexParser<'_>, c: char, _: &CharacterSpec) -> ParseResult<()> {
    let start = parser.i - c.len_utf8();
    let in_script = matches!(
        parser.stack.top().map(|top| &top.kind),
        Some(ItemKind::SubSup { .. })
    );
    let len = if in_script {
        c.len_utf8()
    } else {
        lexer::match_number(&parser.string[start..]).unwrap_or(c.len_utf8())
    };
    parser.i = start + len;
    let text = parser.string[start..parser.i].replace("{,}", ",");
    let node = parser.token(NodeKind::Mn, &text);
    parser.push_node(node)
}

fn operator(parser: &mut TexParser<'_>, c: char, spec: &CharacterSpec) -> ParseResult<()> {
    if c == '.' && parser.peek().is_some_and(|next| next.is_ascii_digit()) {
        return digit(parser, c, spec);
    }
    let text = if spec.text.is_empty() {
        c.to_string()
    } else {
        spec.text.to_owned()
    };
    let mut node = MmlNode::token(NodeKind::Mo, text);
    node.tex_class = spec.class;
    parser.push_node(node)
}

/// Error for a script or prime following an unfilled script.
fn pending_script(parser: &TexParser<'_>) -> Option<ParseErrorKind> {
    match parser.stack.top().map(|top| &top.kind) {
        Some(ItemKind::SubSup {
            position: ScriptPosition::Sub,
            ..
        }) => Some(ParseErrorKind::MissingOpenForSub),
        Some(ItemKind::SubSup {
            position: ScriptPosition::Sup,
            ..
        }) => Some(ParseErrorKind::MissingOpenForSup),
        _ => None,
    }
}

/// Takes the pending prime item off the stack: its base and primes.
fn take_primes(parser: &mut TexParser<'_>) -> Option<(Option<MmlNode>, Option<MmlNode>)> {
    if !matches!(parser.stack.top().map(|top| &top.kind), Some(ItemKind::Prime)) {
        return None;
    }
    let item = parser.stack.pop()?;
    let mut nodes = item.nodes.into_iter();
    Some((nodes.next(), nodes.next()))
}

/// Whether scripts on `base` are set as limits.
fn moves_limits(base: &MmlNode, display: bool) -> bool {
    let marked = |node: &MmlNode| node.get_attr(MOVESUPSUB) == Some("true");
    let op = if marked(base) {
        Some(base)
    } else {
        base.core_mo().filter(|mo| marked(mo))
    };
    op.is_some_and(|op| display || op.get_attr("movablelimits") != Some("true"))
}

/// `^` and `_`: opens a script slot on the previous node.
fn script(parser: &mut TexParser<'_>, c: char, _: &CharacterSpec) -> ParseResult<()> {
    if let Some(kind) = pending_script(parser) {
        return Err(parser.error(kind));
    }
    let position = if c == '_' {
        ScriptPosition::Sub
    } else {
        ScriptPosition::Sup
    };
    let (base, primes) = take_primes(parser).unwrap_or_else(|| (parser.stack.prev(), None));
    let base = base.unwrap_or_else(|| MmlNode::token(NodeKind::Mi, ""));
    let node = if matches!(base.kind, NodeKind::Msubsup | NodeKind::Munderover)
        && base.children.len() == 3
    {
        if !base.children[position.index()].is_placeholder() {
            return Err(parser.error(match position {
                ScriptPosition::Sub => ParseErrorKind::DoubleSubscripts,
                ScriptPosition::Sup => ParseErrorKind::DoubleExponent,
            }));
        }
        base
    } else {
        let kind = if moves_limits(&base, parser.env().display) {
            NodeKind::Munderover
        } else {
            NodeKind::Msubsup
        };
        let provenance = base.provenance.clone();
        let mut node = MmlNode::with_children(
            kind,
            vec![base, MmlNode::placeholder(), MmlNode::placeholder()],
        );
        node.provenance = provenance;
        node
    };
    let item = StackItem::new(ItemKind::SubSup { position, primes }).with_nodes(vec![node]);
    parser.push(item)?;
    parser.update_env(|env| env.script_level = env.script_level.saturating_add(1));
    Ok(())
}

fn prime_text(count: usize) -> String {
    match count {
        1 => "\u{2032}".to_owned(),
        2 => "\u{2033}".to_owned(),
        3 => "\u{2034}".to_owned(),
        4 => "\u{2057}".to_owned(),
        n => "\u{2032}".repeat(n),
    }
}

/// `'`: primes waiting for whatever comes next.
fn prime(parser: &mut TexParser<'_>, _: char, _: &CharacterSpec) -> ParseResult<()> {
    if let Some(kind) = pending_script(parser) {
        return Err(parser.error(kind));
    }
    let mut count = 1;
    while parser.peek() == Some('\'') {
        parser.i += 1;
        count += 1;
    }
    let (base, earlier) = take_primes(parser).unwrap_or_else(|| (parser.stack.prev(), None));
    let base = base.unwrap_or_else(|| MmlNode::token(NodeKind::Mi, ""));
    if matches!(base.kind, NodeKind::Msubsup | NodeKind::Munderover)
        && base
            .child(ScriptPosition::Sup.index())
            .is_some()
    {
        return Err(parser.error(ParseErrorKind::DoubleExponent));
    }
    let mut text = earlier.map(|node| node.text().to_owned()).unwrap_or_default();
    text.push_str(&prime_text(count));
    let primes = MmlNode::token(NodeKind::Mo, text).class(TexClass::Ord);
    let item = parser.item("prime")?.with_nodes(vec![base, primes]);
    parser.push(item)
}

fn entry(parser: &mut TexParser<'_>, c: char, _: &CharacterSpec) -> ParseResult<()> {
    parser.push(StackItem::new(ItemKind::Cell {
        name: c.to_string(),
        entry: true,
        cr: false,
        linebreak: false,
    }))
}

fn nbsp(parser: &mut TexParser<'_>, _: char, _: &CharacterSpec) -> ParseResult<()> {
    parser.push_node(MmlNode::token(NodeKind::Mtext, "\u{00A0}"))
}

fn comment(parser: &mut TexParser<'_>, _: char, _: &CharacterSpec) -> ParseResult<()> {
    while let Some(c) = parser.next_char() {
        if c == '\n' {
            break;
        }
    }
    Ok(())
}

fn misplaced(parser: &mut TexParser<'_>, c: char, _: &CharacterSpec) -> ParseResult<()> {
    Err(parser.error(ParseErrorKind::Misplaced {
        name: c.to_string(),
    }))
}
