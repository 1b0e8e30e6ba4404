//! Control sequences of the base package.

use core::str::FromStr;

use crate::lexer;
use crate::node::{MmlNode, NodeKind};
use crate::parser::{ParseEnv, TexParser};
use crate::registry::MacroSpec;
use crate::retry::ParseResult;
use crate::stack::{ItemKind, StackItem};
use crate::types::{ParseError, ParseErrorKind, TexClass, Variant};

use super::MOVESUPSUB;

/// Built-in commands that are not plain symbols.
pub static COMMANDS: phf::Map<&'static str, MacroSpec> = phf::phf_map! {
    // fonts
    "rm" => MacroSpec::args(font, &["normal"]),
    "mit" => MacroSpec::args(font, &["italic"]),
    "it" => MacroSpec::args(font, &["italic"]),
    "bf" => MacroSpec::args(font, &["bold"]),
    "cal" => MacroSpec::args(font, &["-tex-calligraphic"]),
    "sf" => MacroSpec::args(font, &["sans-serif"]),
    "tt" => MacroSpec::args(font, &["monospace"]),
    "mathrm" => MacroSpec::args(math_font, &["normal"]),
    "mathit" => MacroSpec::args(math_font, &["italic"]),
    "mathbf" => MacroSpec::args(math_font, &["bold"]),
    "mathbb" => MacroSpec::args(math_font, &["double-struck"]),
    "mathcal" => MacroSpec::args(math_font, &["-tex-calligraphic"]),
    "mathscr" => MacroSpec::args(math_font, &["script"]),
    "mathfrak" => MacroSpec::args(math_font, &["fraktur"]),
    "mathsf" => MacroSpec::args(math_font, &["sans-serif"]),
    "mathtt" => MacroSpec::args(math_font, &["monospace"]),

    // fractions and roots
    "frac" => MacroSpec::new(frac),
    "over" => MacroSpec::args(over, &["", "", ""]),
    "atop" => MacroSpec::args(over, &["", "", "0"]),
    "above" => MacroSpec::args(over, &["", "", "dimen"]),
    "choose" => MacroSpec::args(over, &["(", ")", "0"]),
    "brace" => MacroSpec::args(over, &["{", "}", "0"]),
    "brack" => MacroSpec::args(over, &["[", "]", "0"]),
    "sqrt" => MacroSpec::new(sqrt),

    // delimiters
    "left" => MacroSpec::new(left),
    "middle" => MacroSpec::new(middle),
    "right" => MacroSpec::new(right),
    "big" => MacroSpec::args(big_delimiter, &["ORD", "1.2em"]),
    "Big" => MacroSpec::args(big_delimiter, &["ORD", "1.623em"]),
    "bigg" => MacroSpec::args(big_delimiter, &["ORD", "2.047em"]),
    "Bigg" => MacroSpec::args(big_delimiter, &["ORD", "2.470em"]),
    "bigl" => MacroSpec::args(big_delimiter, &["OPEN", "1.2em"]),
    "Bigl" => MacroSpec::args(big_delimiter, &["OPEN", "1.623em"]),
    "biggl" => MacroSpec::args(big_delimiter, &["OPEN", "2.047em"]),
    "Biggl" => MacroSpec::args(big_delimiter, &["OPEN", "2.470em"]),
    "bigr" => MacroSpec::args(big_delimiter, &["CLOSE", "1.2em"]),
    "Bigr" => MacroSpec::args(big_delimiter, &["CLOSE", "1.623em"]),
    "biggr" => MacroSpec::args(big_delimiter, &["CLOSE", "2.047em"]),
    "Biggr" => MacroSpec::args(big_delimiter, &["CLOSE", "2.470em"]),
    "bigm" => MacroSpec::args(big_delimiter, &["REL", "1.2em"]),
    "Bigm" => MacroSpec::args(big_delimiter, &["REL", "1.623em"]),
    "biggm" => MacroSpec::args(big_delimiter, &["REL", "2.047em"]),
    "Biggm" => MacroSpec::args(big_delimiter, &["REL", "2.470em"]),

    // grouping and environments
    "begin" => MacroSpec::new(begin),
    "end" => MacroSpec::new(end),
    "begingroup" => MacroSpec::new(begingroup),
    "endgroup" => MacroSpec::new(endgroup),
    "\\" => MacroSpec::new(cr),
    "cr" => MacroSpec::new(cr),
    "hline" => MacroSpec::args(hline, &["solid"]),
    "hdashline" => MacroSpec::args(hline, &["dashed"]),

    // styles and box moves
    "displaystyle" => MacroSpec::args(style, &["true", "0"]),
    "textstyle" => MacroSpec::args(style, &["false", "0"]),
    "scriptstyle" => MacroSpec::args(style, &["false", "1"]),
    "scriptscriptstyle" => MacroSpec::args(style, &["false", "2"]),
    "raise" => MacroSpec::args(position, &["raise"]),
    "lower" => MacroSpec::args(position, &["lower"]),
    "moveleft" => MacroSpec::args(position, &["moveleft"]),
    "moveright" => MacroSpec::args(position, &["moveright"]),

    // under and over
    "overline" => MacroSpec::args(under_over, &["over", "\u{2015}"]),
    "underline" => MacroSpec::args(under_over, &["under", "\u{2015}"]),
    "overbrace" => MacroSpec::args(under_over, &["over", "\u{23DE}", "limits"]),
    "underbrace" => MacroSpec::args(under_over, &["under", "\u{23DF}", "limits"]),
    "overset" => MacroSpec::args(set_above, &["over"]),
    "underset" => MacroSpec::args(set_above, &["under"]),
    "stackrel" => MacroSpec::args(set_above, &["over", "REL"]),

    // text and spacing
    "text" => MacroSpec::new(text),
    "mbox" => MacroSpec::new(text),
    "hbox" => MacroSpec::new(text),
    "textrm" => MacroSpec::args(text, &["normal"]),
    "textit" => MacroSpec::args(text, &["italic"]),
    "textbf" => MacroSpec::args(text, &["bold"]),
    "textsf" => MacroSpec::args(text, &["sans-serif"]),
    "texttt" => MacroSpec::args(text, &["monospace"]),
    "," => MacroSpec::args(spacing, &["0.1667em"]),
    ":" => MacroSpec::args(spacing, &["0.2222em"]),
    ">" => MacroSpec::args(spacing, &["0.2222em"]),
    ";" => MacroSpec::args(spacing, &["0.2778em"]),
    "!" => MacroSpec::args(spacing, &["-0.1667em"]),
    "enspace" => MacroSpec::args(spacing, &["0.5em"]),
    "quad" => MacroSpec::args(spacing, &["1em"]),
    "qquad" => MacroSpec::args(spacing, &["2em"]),
    " " => MacroSpec::new(nbsp),
    "hspace" => MacroSpec::new(hspace),
    "hskip" => MacroSpec::new(hspace),
    "kern" => MacroSpec::new(hspace),

    // operators and classes
    "not" => MacroSpec::new(not),
    "limits" => MacroSpec::args(limits, &["true"]),
    "nolimits" => MacroSpec::args(limits, &["false"]),
    "mathop" => MacroSpec::args(math_class, &["OP"]),
    "mathord" => MacroSpec::args(math_class, &["ORD"]),
    "mathbin" => MacroSpec::args(math_class, &["BIN"]),
    "mathrel" => MacroSpec::args(math_class, &["REL"]),
    "mathopen" => MacroSpec::args(math_class, &["OPEN"]),
    "mathclose" => MacroSpec::args(math_class, &["CLOSE"]),
    "mathpunct" => MacroSpec::args(math_class, &["PUNCT"]),
    "mathinner" => MacroSpec::args(math_class, &["INNER"]),
    "phantom" => MacroSpec::args(phantom, &["both"]),
    "vphantom" => MacroSpec::args(phantom, &["vertical"]),
    "hphantom" => MacroSpec::args(phantom, &["horizontal"]),
    "relax" => MacroSpec::new(relax),
};

/// A nested parse result as one child node.
fn settle(mut node: MmlNode) -> MmlNode {
    node.inferred = false;
    node
}

/// The nodes a nested parse produced, without an inferred row around them.
pub(crate) fn contents(node: MmlNode) -> Vec<MmlNode> {
    if node.inferred && node.kind == NodeKind::Mrow {
        node.children
    } else {
        vec![node]
    }
}

fn variant(spec: &MacroSpec) -> Result<Variant, ParseError> {
    Ok(Variant::from_str(spec.arg(0))?)
}

/// A symbol set as an identifier.
pub(super) fn identifier(parser: &mut TexParser<'_>, _: &str, spec: &MacroSpec) -> ParseResult<()> {
    let node = parser.token(NodeKind::Mi, spec.text);
    parser.push_node(node)
}

/// An identifier that stays upright unless a font says otherwise.
pub(super) fn upright_identifier(
    parser: &mut TexParser<'_>,
    _: &str,
    spec: &MacroSpec,
) -> ParseResult<()> {
    let mut node = parser.token(NodeKind::Mi, spec.text);
    if node.get_attr("mathvariant").is_none() {
        node.set_attr("mathvariant", Variant::Normal.as_ref());
    }
    parser.push_node(node)
}

pub(super) fn operator(parser: &mut TexParser<'_>, _: &str, spec: &MacroSpec) -> ParseResult<()> {
    let mut node = MmlNode::token(NodeKind::Mo, spec.arg(0));
    node.tex_class = TexClass::from_str(spec.arg(1)).ok();
    parser.push_node(node)
}

/// `\sum`, `\int`, ...: an operator that is large in display style and,
/// for some, takes its scripts as limits.
pub(super) fn large_op(parser: &mut TexParser<'_>, _: &str, spec: &MacroSpec) -> ParseResult<()> {
    let mut node = MmlNode::token(NodeKind::Mo, spec.arg(0)).class(TexClass::Op);
    if parser.env().display {
        node.set_attr("largeop", "true");
    }
    if spec.arg(1) == "limits" {
        node.set_attr("movablelimits", "true");
        node.set_attr(MOVESUPSUB, "true");
    }
    parser.push_node(node)
}

/// `\sin`, `\log`, ...: the name waits in a function item for its argument.
pub(super) fn named_fn(parser: &mut TexParser<'_>, _: &str, spec: &MacroSpec) -> ParseResult<()> {
    let mut name = MmlNode::token(NodeKind::Mi, spec.text)
        .attr("mathvariant", Variant::Normal.as_ref())
        .class(TexClass::Op);
    name.provenance = parser.consumed();
    let item = parser.item("fn")?.with_nodes(vec![name]);
    parser.push(item)
}

/// `\lim`, `\max`, ...: a named operator with movable limits.
pub(super) fn named_op(parser: &mut TexParser<'_>, _: &str, spec: &MacroSpec) -> ParseResult<()> {
    let node = MmlNode::token(NodeKind::Mo, spec.text)
        .attr("movablelimits", "true")
        .attr(MOVESUPSUB, "true")
        .class(TexClass::Op);
    parser.push_node(node)
}

pub(super) fn accent(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let base = parser.parse_arg(name)?;
    let mark = MmlNode::token(NodeKind::Mo, spec.arg(0)).attr("stretchy", spec.arg(1));
    let node = MmlNode::with_children(NodeKind::Mover, vec![settle(base), mark]).attr("accent", "true");
    parser.push_node(node)
}

/// `\rm`, `\bf`, ...: switches the font up to the end of the group.
fn font(parser: &mut TexParser<'_>, _: &str, spec: &MacroSpec) -> ParseResult<()> {
    let font = variant(spec)?;
    parser.update_env(|env| env.font = Some(font));
    Ok(())
}

/// `\mathrm{..}`, `\mathbb{..}`, ...
fn math_font(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let font = variant(spec)?;
    let text = parser.get_argument(name, false)?;
    let env = ParseEnv {
        font: Some(font),
        ..parser.env()
    };
    let node = parser.sub_parse(&text, env)?;
    parser.push_node(settle(node))
}

fn frac(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let num = parser.parse_arg(name)?;
    let den = parser.parse_arg(name)?;
    parser.push_node(MmlNode::with_children(
        NodeKind::Mfrac,
        vec![settle(num), settle(den)],
    ))
}

/// `\over` and its relatives: the rest of the group becomes the
/// denominator. Arguments are the fencing delimiters and the rule
/// thickness, where `dimen` reads it from the input.
fn over(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let thickness = match spec.arg(2) {
        "" => None,
        "dimen" => Some(parser.get_dimen(name)?),
        value => Some(value.to_owned()),
    };
    parser.push(StackItem::new(ItemKind::Over {
        name: name.to_owned(),
        num: None,
        thickness,
        open: spec.arg(0).to_owned(),
        close: spec.arg(1).to_owned(),
        num_start: 0,
    }))
}

fn sqrt(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let index = parser.get_brackets(name)?;
    let base = parser.parse_arg(name)?;
    let node = match index {
        Some(index) => {
            let env = parser.env();
            let index = parser.sub_parse(
                &index,
                ParseEnv {
                    script_level: env.script_level.saturating_add(2),
                    ..env
                },
            )?;
            MmlNode::with_children(NodeKind::Mroot, vec![settle(base), settle(index)])
        }
        None => MmlNode::with_children(NodeKind::Msqrt, contents(base)),
    };
    parser.push_node(node)
}

fn left(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let delim = parser.get_delimiter(name)?;
    parser.begin_group();
    parser.push(StackItem::new(ItemKind::Left {
        delim: delim.to_owned(),
    }))
}

fn middle(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let delim = parser.get_delimiter(name)?;
    parser.push(StackItem::new(ItemKind::Middle {
        delim: delim.to_owned(),
    }))
}

fn right(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let delim = parser.get_delimiter(name)?;
    parser.push(StackItem::new(ItemKind::Right {
        delim: delim.to_owned(),
    }))?;
    parser.end_group()
}

/// `\big(`, `\Bigl[`, ...: a delimiter of fixed size.
fn big_delimiter(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let delim = parser.get_delimiter(name)?;
    let size = spec.arg(1);
    let mut node = MmlNode::token(NodeKind::Mo, delim)
        .attr("minsize", size)
        .attr("maxsize", size)
        .attr("stretchy", "true")
        .attr("symmetric", "true");
    node.tex_class = TexClass::from_str(spec.arg(0)).ok();
    parser.push_node(node)
}

fn begin(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let env = environment_name(parser, name)?;
    parser.begin_group();
    parser.begin_environment(&env)
}

fn end(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let env = environment_name(parser, name)?;
    parser.end_environment(&env)
}

fn environment_name(parser: &mut TexParser<'_>, name: &str) -> ParseResult<String> {
    let env = parser.get_argument(name, false)?;
    let env = env.trim();
    if env.is_empty() || env.contains(['\\', '{', '}', '$']) {
        return Err(parser.error(ParseErrorKind::InvalidEnv {
            name: env.to_owned(),
        }));
    }
    Ok(env.to_owned())
}

fn begingroup(parser: &mut TexParser<'_>, _: &str, _: &MacroSpec) -> ParseResult<()> {
    let item = parser.item("begingroup")?;
    parser.begin_group();
    parser.push(item)
}

fn endgroup(parser: &mut TexParser<'_>, _: &str, _: &MacroSpec) -> ParseResult<()> {
    let item = parser.item("endgroup")?;
    parser.push(item)?;
    parser.end_group()
}

/// `\\` and `\cr`: ends a table row, with optional extra spacing.
fn cr(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    if let Some(spacing) = parser.get_brackets(name)?
        && lexer::match_dimen(&spacing, false).is_none()
    {
        return Err(parser.error(ParseErrorKind::BracketMustBeDimension {
            name: name.to_owned(),
        }));
    }
    parser.push(StackItem::new(ItemKind::Cell {
        name: name.to_owned(),
        entry: false,
        cr: true,
        linebreak: true,
    }))
}

fn hline(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let result = match parser.stack.top_mut() {
        Some(StackItem {
            kind: ItemKind::Array(state) | ItemKind::EqnArray(state),
            nodes,
            ..
        }) => state.hline(nodes.is_empty(), spec.arg(0)),
        _ => Err(ParseError::new(ParseErrorKind::Misplaced {
            name: name.to_owned(),
        })),
    };
    Ok(result?)
}

/// `\displaystyle` and friends.
fn style(parser: &mut TexParser<'_>, _: &str, spec: &MacroSpec) -> ParseResult<()> {
    let display = spec.arg(0) == "true";
    let level = spec.arg(1);
    parser.push(StackItem::new(ItemKind::Style {
        attrs: vec![
            ("displaystyle".to_owned(), spec.arg(0).to_owned()),
            ("scriptlevel".to_owned(), level.to_owned()),
        ],
    }))?;
    let level = level.parse::<u8>().unwrap_or_default();
    parser.update_env(|env| {
        env.display = display;
        env.script_level = level;
    });
    Ok(())
}

fn negate(dimen: &str) -> String {
    dimen
        .strip_prefix('-')
        .map_or_else(|| format!("-{dimen}"), str::to_owned)
}

/// `\raise`, `\lower`, `\moveleft`, `\moveright`: shifts the next box.
fn position(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let dimen = parser.get_dimen(name)?;
    let signed = |value: &str| {
        if value.starts_with('-') {
            value.to_owned()
        } else {
            format!("+{value}")
        }
    };
    let attrs: Vec<(&str, String)> = match spec.arg(0) {
        "raise" | "lower" => {
            let shift = if spec.arg(0) == "lower" {
                negate(&dimen)
            } else {
                dimen
            };
            vec![
                ("height", signed(&shift)),
                ("depth", signed(&negate(&shift))),
                ("voffset", shift),
            ]
        }
        _ => {
            let shift = if spec.arg(0) == "moveleft" {
                negate(&dimen)
            } else {
                dimen
            };
            vec![("width", signed(&shift)), ("lspace", shift)]
        }
    };
    parser.push(StackItem::new(ItemKind::Position {
        name: name.to_owned(),
        attrs: attrs
            .into_iter()
            .map(|(attr, value)| (attr.to_owned(), value))
            .collect(),
    }))
}

/// `\overline`, `\underbrace`, ...: a stretchy mark above or below.
fn under_over(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let base = parser.parse_arg(name)?;
    let mark = MmlNode::token(NodeKind::Mo, spec.arg(1)).attr("stretchy", "true");
    let (kind, accent) = if spec.arg(0) == "under" {
        (NodeKind::Munder, "accentunder")
    } else {
        (NodeKind::Mover, "accent")
    };
    let mut node = MmlNode::with_children(kind, vec![settle(base), mark]);
    if spec.arg(2) == "limits" {
        node.set_attr(MOVESUPSUB, "true");
        node.tex_class = Some(TexClass::Op);
    } else {
        node.set_attr(accent, "true");
    }
    parser.push_node(node)
}

/// `\overset{a}{b}`, `\underset{a}{b}` and `\stackrel{a}{b}`.
fn set_above(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let script = parser.parse_arg(name)?;
    let base = parser.parse_arg(name)?;
    let kind = if spec.arg(0) == "under" {
        NodeKind::Munder
    } else {
        NodeKind::Mover
    };
    let node = MmlNode::with_children(kind, vec![settle(base), settle(script)]);
    let node = match TexClass::from_str(spec.arg(1)) {
        Ok(class) => MmlNode::with_children(NodeKind::TeXAtom, vec![node]).class(class),
        Err(_) => node,
    };
    parser.push_node(node)
}

/// `\text{..}` and friends. `$..$` inside the text is math again.
fn text(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let content = parser.get_argument(name, false)?;
    let font = Variant::from_str(spec.arg(0)).ok();
    let mut nodes = Vec::new();
    for (k, part) in content.split('$').enumerate() {
        if k % 2 == 1 {
            let env = ParseEnv {
                display: false,
                font: None,
                ..parser.env()
            };
            nodes.push(settle(parser.sub_parse(part, env)?));
        } else if !part.is_empty() {
            let mut node = MmlNode::token(NodeKind::Mtext, text_spaces(part));
            if let Some(font) = font.or(parser.env().font) {
                node.set_attr("mathvariant", font.as_ref());
            }
            nodes.push(node);
        }
    }
    let node = match nodes.len() {
        0 => MmlNode::token(NodeKind::Mtext, ""),
        1 => nodes.remove(0),
        _ => MmlNode::with_children(NodeKind::Mrow, nodes),
    };
    parser.push_node(node)
}

/// Leading and trailing spaces of text survive as no-break spaces.
fn text_spaces(text: &str) -> String {
    let inner = text.trim();
    if inner.is_empty() {
        return "\u{00A0}".to_owned();
    }
    let mut out = String::with_capacity(text.len() + 4);
    if text.starts_with(char::is_whitespace) {
        out.push('\u{00A0}');
    }
    out.push_str(inner);
    if text.ends_with(char::is_whitespace) {
        out.push('\u{00A0}');
    }
    out
}

fn spacing(parser: &mut TexParser<'_>, _: &str, spec: &MacroSpec) -> ParseResult<()> {
    parser.push_node(MmlNode::new(NodeKind::Mspace).attr("width", spec.arg(0)))
}

fn nbsp(parser: &mut TexParser<'_>, _: &str, _: &MacroSpec) -> ParseResult<()> {
    parser.push_node(MmlNode::token(NodeKind::Mtext, "\u{00A0}"))
}

fn hspace(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let width = parser.get_dimen(name)?;
    parser.push_node(MmlNode::new(NodeKind::Mspace).attr("width", width))
}

fn not(parser: &mut TexParser<'_>, _: &str, _: &MacroSpec) -> ParseResult<()> {
    let item = parser.item("not")?;
    parser.push(item)
}

/// `\limits` and `\nolimits` on the preceding operator.
fn limits(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let limits = spec.arg(0);
    let op = parser
        .stack
        .top_mut()
        .and_then(|top| top.nodes.last_mut())
        .filter(|node| {
            node.effective_class() == TexClass::Op
                && matches!(node.kind, NodeKind::Mo | NodeKind::TeXAtom)
        });
    let Some(op) = op else {
        return Err(parser.error(ParseErrorKind::Misplaced {
            name: name.to_owned(),
        }));
    };
    op.set_attr(MOVESUPSUB, limits);
    op.set_attr("movablelimits", "false");
    Ok(())
}

/// `\mathop{..}`, `\mathrel{..}`, ...: the argument with a forced class.
fn math_class(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let class = TexClass::from_str(spec.arg(0)).map_err(ParseError::from)?;
    let arg = parser.parse_arg(name)?;
    let mut atom = MmlNode::with_children(NodeKind::TeXAtom, contents(arg)).class(class);
    if class == TexClass::Op {
        atom.set_attr("movablelimits", "true");
        atom.set_attr(MOVESUPSUB, "true");
    }
    parser.push_node(atom)
}

fn phantom(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let arg = parser.parse_arg(name)?;
    let ghost = MmlNode::with_children(NodeKind::Mphantom, contents(arg));
    let node = match spec.arg(0) {
        "vertical" => MmlNode::with_children(NodeKind::Mpadded, vec![ghost]).attr("width", "0"),
        "horizontal" => MmlNode::with_children(NodeKind::Mpadded, vec![ghost])
            .attr("height", "0")
            .attr("depth", "0"),
        _ => ghost,
    };
    parser.push_node(node)
}

const fn relax(_: &mut TexParser<'_>, _: &str, _: &MacroSpec) -> ParseResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_spaces() {
        assert_eq!(text_spaces(" if "), "\u{00A0}if\u{00A0}");
        assert_eq!(text_spaces("a b"), "a b");
        assert_eq!(text_spaces("  "), "\u{00A0}");
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate("1em"), "-1em");
        assert_eq!(negate("-2pt"), "2pt");
    }

    #[test]
    fn test_command_table() {
        assert!(COMMANDS.contains_key("frac"));
        assert!(COMMANDS.contains_key("\\"));
        assert_eq!(COMMANDS.get("choose").map(|spec| spec.arg(0)), Some("("));
    }
}
