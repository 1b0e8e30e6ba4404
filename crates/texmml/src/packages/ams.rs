//! AMS math: matrices and alignments, numbered environments, `\tag`,
//! `\label`/`\ref`, generalized fractions and operator names.

use core::str::FromStr;

use crate::lexer;
use crate::node::{MmlNode, NodeKind};
use crate::parser::{ParseEnv, TexParser, substitute};
use crate::registry::{EnvironmentSpec, HandlerMap, MacroSpec, Package};
use crate::retry::ParseResult;
use crate::stack::{ArrayState, ItemKind, StackItem, fenced};
use crate::tags::TagOperation;
use crate::types::{ParseErrorKind, TexClass, Variant};

use super::EXTENSION_PRIORITY;
use super::base::{self, MOVESUPSUB};

/// Registration name.
pub const NAME: &str = "ams";

/// Environments: handler parameters are `[open, close, columnalign]` for
/// arrays and `[columnalign, numbered]` for numbered alignments.
static ENVIRONMENTS: phf::Map<&'static str, EnvironmentSpec> = phf::phf_map! {
    "matrix" => EnvironmentSpec { handler: matrix, args: &["", "", "center"] },
    "pmatrix" => EnvironmentSpec { handler: matrix, args: &["(", ")", "center"] },
    "bmatrix" => EnvironmentSpec { handler: matrix, args: &["[", "]", "center"] },
    "Bmatrix" => EnvironmentSpec { handler: matrix, args: &["{", "}", "center"] },
    "vmatrix" => EnvironmentSpec { handler: matrix, args: &["|", "|", "center"] },
    "Vmatrix" => EnvironmentSpec { handler: matrix, args: &["\u{2016}", "\u{2016}", "center"] },
    "smallmatrix" => EnvironmentSpec { handler: matrix, args: &["", "", "center", "small"] },
    "cases" => EnvironmentSpec { handler: matrix, args: &["{", "", "left left"] },
    "aligned" => EnvironmentSpec { handler: matrix, args: &["", "", "right left right left right left"] },
    "gathered" => EnvironmentSpec { handler: matrix, args: &["", "", "center"] },
    "array" => EnvironmentSpec { handler: array, args: &[] },
    "equation" => EnvironmentSpec { handler: equation, args: &["numbered"] },
    "equation*" => EnvironmentSpec { handler: equation, args: &[""] },
    "align" => EnvironmentSpec { handler: eqn_array, args: &["right left right left right left", "numbered"] },
    "align*" => EnvironmentSpec { handler: eqn_array, args: &["right left right left right left", ""] },
    "gather" => EnvironmentSpec { handler: eqn_array, args: &["center", "numbered"] },
    "gather*" => EnvironmentSpec { handler: eqn_array, args: &["center", ""] },
    "eqnarray" => EnvironmentSpec { handler: eqn_array, args: &["right center left", "numbered"] },
    "eqnarray*" => EnvironmentSpec { handler: eqn_array, args: &["right center left", ""] },
};

/// Commands: fraction parameters are `[open, close, thickness, style]`.
static COMMANDS: phf::Map<&'static str, MacroSpec> = phf::phf_map! {
    "tag" => MacroSpec::new(tag),
    "notag" => MacroSpec::new(notag),
    "nonumber" => MacroSpec::new(notag),
    "label" => MacroSpec::new(label),
    "ref" => MacroSpec::args(reference, &[""]),
    "eqref" => MacroSpec::args(reference, &["eq"]),
    "genfrac" => MacroSpec::new(genfrac),
    "dfrac" => MacroSpec::args(fraction, &["", "", "", "0"]),
    "tfrac" => MacroSpec::args(fraction, &["", "", "", "1"]),
    "binom" => MacroSpec::args(fraction, &["(", ")", "0", ""]),
    "dbinom" => MacroSpec::args(fraction, &["(", ")", "0", "0"]),
    "tbinom" => MacroSpec::args(fraction, &["(", ")", "0", "1"]),
    "operatorname" => MacroSpec::new(operator_name),
    "boxed" => MacroSpec::new(boxed),
    "bmod" => MacroSpec::args(expand_text, &["\\mathbin{\\rm mod}", "0"]),
    "pmod" => MacroSpec::args(expand_text, &["\\quad(\\mathrm{mod}\\,\\,#1)", "1"]),
    "mod" => MacroSpec::args(expand_text, &["\\quad\\mathrm{mod}\\,\\,#1", "1"]),
};

/// Builds the ams package.
#[must_use]
pub fn package() -> Package {
    Package {
        macros: vec![HandlerMap::from_table("ams-commands", &COMMANDS, |spec| spec)],
        environments: vec![HandlerMap::from_table(
            "ams-environments",
            &ENVIRONMENTS,
            |spec| spec,
        )],
        requires: vec![base::NAME.to_owned()],
        ..Package::new(NAME, EXTENSION_PRIORITY)
    }
}

fn env_name(begin: &StackItem) -> String {
    match &begin.kind {
        ItemKind::Begin { name } => name.clone(),
        _ => String::new(),
    }
}

/// Opens an array item over `state` inside `begin`.
fn open_array(
    parser: &mut TexParser<'_>,
    begin: StackItem,
    state: ArrayState,
    numbered: bool,
) -> ParseResult<()> {
    parser.push(begin)?;
    let item = if numbered {
        ItemKind::EqnArray(Box::new(state))
    } else {
        ItemKind::Array(Box::new(state))
    };
    parser.push(StackItem::new(item))
}

fn matrix(parser: &mut TexParser<'_>, begin: StackItem, spec: &EnvironmentSpec) -> ParseResult<()> {
    let mut state = ArrayState::new(&env_name(&begin)).attr("columnalign", spec.arg(2));
    if !spec.arg(0).is_empty() || !spec.arg(1).is_empty() {
        state = state.fenced(spec.arg(0), spec.arg(1));
    }
    let small = spec.arg(3) == "small";
    if small {
        state = state
            .attr("columnspacing", "0.333em")
            .attr("rowspacing", "0.2em");
    }
    open_array(parser, begin, state, false)?;
    parser.update_env(|env| {
        env.display = false;
        if small {
            env.script_level = env.script_level.saturating_add(1);
        }
    });
    Ok(())
}

/// `\begin{array}[pos]{preamble}`
fn array(parser: &mut TexParser<'_>, begin: StackItem, _: &EnvironmentSpec) -> ParseResult<()> {
    let name = env_name(&begin);
    let cs = format!("\\begin{{{name}}}");
    let position = parser.get_brackets(&cs)?;
    let preamble = parser.get_argument(&cs, false)?;
    let mut state = ArrayState::new(&name);
    state.preamble(&preamble)?;
    match position.as_deref().map(str::trim) {
        Some("t") => state = state.attr("align", "baseline 1"),
        Some("b") => state = state.attr("align", "baseline -1"),
        _ => {}
    }
    open_array(parser, begin, state, false)?;
    parser.update_env(|env| env.display = false);
    Ok(())
}

/// Numbering environments may not nest.
fn check_nesting(parser: &TexParser<'_>) -> ParseResult<()> {
    if parser.state.tags.current().env.is_empty() {
        Ok(())
    } else {
        Err(parser.error(ParseErrorKind::ErroneousNestingEq))
    }
}

fn equation(parser: &mut TexParser<'_>, begin: StackItem, spec: &EnvironmentSpec) -> ParseResult<()> {
    check_nesting(parser)?;
    let name = env_name(&begin);
    parser.push(begin)?;
    parser
        .state
        .tags
        .start(&name, true, spec.arg(0) == "numbered");
    parser.push(StackItem::new(ItemKind::Equation { name }))?;
    parser.update_env(|env| env.display = true);
    Ok(())
}

fn eqn_array(parser: &mut TexParser<'_>, begin: StackItem, spec: &EnvironmentSpec) -> ParseResult<()> {
    check_nesting(parser)?;
    let name = env_name(&begin);
    parser
        .state
        .tags
        .start(&name, true, spec.arg(1) == "numbered");
    let state = ArrayState::new(&name)
        .attr("columnalign", spec.arg(0))
        .attr("displaystyle", "true");
    open_array(parser, begin, state, true)?;
    parser.update_env(|env| env.display = true);
    Ok(())
}

/// `\tag{..}` and `\tag*{..}`.
fn tag(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    parser.state.tags.check(TagOperation::Tag)?;
    let raw = parser.get_star();
    let text = parser.get_argument(name, false)?;
    let current = parser.state.tags.current();
    if !current.env.is_empty() && !current.taggable {
        return Err(parser.error(ParseErrorKind::CommandNotAllowedInEnv {
            name: name.to_owned(),
            env: current.env.clone(),
        }));
    }
    if current.tag.is_some() {
        return Err(parser.error(ParseErrorKind::MultipleCommand {
            name: name.to_owned(),
        }));
    }
    parser.state.tags.tag(text.trim(), raw);
    Ok(())
}

fn notag(parser: &mut TexParser<'_>, _: &str, _: &MacroSpec) -> ParseResult<()> {
    parser.state.tags.check(TagOperation::NoTag)?;
    parser.state.tags.notag();
    Ok(())
}

fn label(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    parser.state.tags.check(TagOperation::Label)?;
    let label = parser.get_argument(name, false)?;
    parser.state.tags.label(label.trim())?;
    Ok(())
}

/// `\ref{..}` and `\eqref{..}`: a link showing the referenced tag.
fn reference(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    parser.state.tags.check(TagOperation::Ref)?;
    let label = parser.get_argument(name, false)?;
    let found = parser.state.tags.reference(label.trim());
    let text = if spec.arg(0) == "eq" {
        parser.state.tags.policy().format_tag(&found.tag)
    } else {
        found.tag
    };
    let node = MmlNode::with_children(NodeKind::Mrow, vec![MmlNode::token(NodeKind::Mtext, text)])
        .attr("href", parser.state.tags.url(&found.id))
        .class(TexClass::Ord);
    parser.push_node(node)
}

/// Style wrapper for a fraction style number: 0 display, 1 text, 2 script,
/// 3 scriptscript.
fn fraction_style(style: &str, node: MmlNode) -> MmlNode {
    let (display, level) = match style.trim() {
        "0" => ("true", "0"),
        "1" => ("false", "0"),
        "2" => ("false", "1"),
        "3" => ("false", "2"),
        _ => return node,
    };
    MmlNode::with_children(NodeKind::Mstyle, vec![node])
        .attr("displaystyle", display)
        .attr("scriptlevel", level)
}

fn build_fraction(
    parser: &mut TexParser<'_>,
    name: &str,
    (open, close): (&str, &str),
    thickness: &str,
    style: &str,
) -> ParseResult<()> {
    let num = parser.parse_arg(name)?;
    let den = parser.parse_arg(name)?;
    let mut frac = MmlNode::with_children(NodeKind::Mfrac, vec![row(num), row(den)]);
    if !thickness.is_empty() {
        frac.set_attr("linethickness", thickness);
    }
    let node = if open.is_empty() && close.is_empty() {
        frac
    } else {
        fenced(open, vec![frac], close)
    };
    parser.push_node(fraction_style(style, node))
}

fn row(mut node: MmlNode) -> MmlNode {
    node.inferred = false;
    node
}

fn fraction(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    build_fraction(
        parser,
        name,
        (spec.arg(0), spec.arg(1)),
        spec.arg(2),
        spec.arg(3),
    )
}

/// A delimiter given as a braced argument; empty means none.
fn delimiter_arg(parser: &mut TexParser<'_>, name: &str) -> ParseResult<&'static str> {
    let arg = parser.get_argument(name, false)?;
    let key = match arg.trim() {
        "" => ".",
        key => key,
    };
    parser.config.delimiter(key).map(|delim| delim.text).ok_or_else(|| {
        parser.error(ParseErrorKind::MissingOrUnrecognizedDelim {
            name: name.to_owned(),
        })
    })
}

/// `\genfrac{left}{right}{thickness}{style}{num}{den}`
fn genfrac(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let open = delimiter_arg(parser, name)?;
    let close = delimiter_arg(parser, name)?;
    let thickness = parser.get_argument(name, false)?;
    let thickness = match thickness.trim() {
        "" => String::new(),
        text => lexer::match_dimen(text, false)
            .map(|dimen| dimen.to_css())
            .ok_or_else(|| {
                parser.error(ParseErrorKind::MissingDimOrUnits {
                    name: name.to_owned(),
                })
            })?,
    };
    let style = parser.get_argument(name, false)?;
    build_fraction(parser, name, (open, close), &thickness, &style)
}

/// `\operatorname{..}` names a function; `\operatorname*{..}` an operator
/// with limits.
fn operator_name(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let limits = parser.get_star();
    let text = parser.get_argument(name, false)?;
    let text = text.trim();
    let mut node = if !text.is_empty() && text.chars().all(char::is_alphabetic) {
        MmlNode::token(NodeKind::Mi, text)
    } else {
        let env = ParseEnv {
            font: Some(Variant::Normal),
            ..parser.env()
        };
        let parsed = parser.sub_parse(text, env)?;
        MmlNode::with_children(NodeKind::TeXAtom, vec![row(parsed)])
    };
    node.set_attr("mathvariant", Variant::Normal.as_ref());
    node.tex_class = Some(TexClass::Op);
    if limits {
        node.set_attr("movablelimits", "true");
        node.set_attr(MOVESUPSUB, "true");
        return parser.push_node(node);
    }
    node.provenance = parser.consumed();
    let item = parser.item("fn")?.with_nodes(vec![node]);
    parser.push(item)
}

fn boxed(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let arg = parser.parse_arg(name)?;
    parser.push_node(MmlNode::with_children(NodeKind::Menclose, vec![row(arg)]).attr("notation", "box"))
}

/// A command defined by replacement text: `[body, parameter count]`.
fn expand_text(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let params = usize::from_str(spec.arg(1)).unwrap_or_default();
    let args = parser.get_macro_args(name, params, None)?;
    parser.expand(&substitute(spec.arg(0), &args))
}
