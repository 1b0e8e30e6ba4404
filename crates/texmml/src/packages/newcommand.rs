//! User definitions: `\def`, `\gdef`, `\global`, `\let`, `\newcommand`,
//! `\renewcommand`, `\providecommand`, `\newenvironment` and
//! `\renewenvironment`.
//!
//! Definitions live in the parse namespace and follow its grouping: they
//! vanish with the group they were made in unless made global.

use log::trace;

use crate::lexer;
use crate::parser::{Definition, EnvironmentDef, MacroDef, TexParser, env_key};
use crate::registry::{HandlerMap, MacroSpec, Package};
use crate::retry::ParseResult;
use crate::types::ParseErrorKind;

use super::EXTENSION_PRIORITY;
use super::base;

/// Registration name.
pub const NAME: &str = "newcommand";

static COMMANDS: phf::Map<&'static str, MacroSpec> = phf::phf_map! {
    "def" => MacroSpec::args(def, &["local"]),
    "gdef" => MacroSpec::args(def, &["global"]),
    "global" => MacroSpec::new(global),
    "let" => MacroSpec::new(let_),
    "newcommand" => MacroSpec::args(new_command, &["new"]),
    "renewcommand" => MacroSpec::args(new_command, &["renew"]),
    "providecommand" => MacroSpec::args(new_command, &["provide"]),
    "newenvironment" => MacroSpec::args(new_environment, &["new"]),
    "renewenvironment" => MacroSpec::args(new_environment, &["renew"]),
};

/// Commands `\global` may precede.
static PREFIXABLE: phf::Set<&'static str> = phf::phf_set! {
    "def",
    "gdef",
    "let",
    "global",
};

/// Builds the newcommand package.
#[must_use]
pub fn package() -> Package {
    Package {
        macros: vec![HandlerMap::from_table("newcommand", &COMMANDS, |spec| spec)],
        requires: vec![base::NAME.to_owned()],
        ..Package::new(NAME, EXTENSION_PRIORITY)
    }
}

/// Stores `def` under `name`.
fn define(
    parser: &mut TexParser<'_>,
    name: &str,
    def: Option<Definition>,
    global: bool,
) -> ParseResult<()> {
    trace!("define '{name}' (global: {global})");
    parser.state.namespace.define(name, def, global)?;
    Ok(())
}

/// The control sequence being defined, without its backslash.
fn macro_name(parser: &mut TexParser<'_>, name: &str) -> ParseResult<String> {
    let arg = parser.get_argument(name, false)?;
    let arg = arg.trim();
    if let Some(cs) = arg.strip_prefix('\\') {
        let (scanned, len) = lexer::scan_cs_name(cs);
        if len > 0 && len == cs.len() {
            return Ok(scanned.to_owned());
        }
    }
    Err(parser.error(ParseErrorKind::IllegalControlSequenceName {
        name: name.to_owned(),
    }))
}

/// A parameter count given in brackets.
fn param_count(parser: &TexParser<'_>, name: &str, count: Option<&str>) -> ParseResult<usize> {
    let Some(count) = count else {
        return Ok(0);
    };
    count
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n <= 9)
        .ok_or_else(|| {
            parser.error(ParseErrorKind::IllegalParamNumber {
                name: name.to_owned(),
            })
        })
}

/// Reads a `\def` parameter template up to the opening brace of the body:
/// the parameter count and the delimiter texts.
fn template(parser: &mut TexParser<'_>, name: &str) -> ParseResult<(usize, Vec<String>)> {
    parser.skip_spaces();
    let mut params = 0;
    let mut delimiters = vec![String::new()];
    loop {
        match parser.peek() {
            None => {
                return Err(parser.error(ParseErrorKind::MissingArgFor {
                    name: name.to_owned(),
                }));
            }
            Some('{') => break,
            Some('#') => {
                parser.i += 1;
                let n = parser.next_char().and_then(|c| c.to_digit(10));
                match n {
                    Some(n) if n as usize == params + 1 => {
                        params += 1;
                        delimiters.push(String::new());
                    }
                    Some(1..=9) => {
                        return Err(parser.error(ParseErrorKind::SequentialParam {
                            name: name.to_owned(),
                        }));
                    }
                    _ => {
                        return Err(parser.error(ParseErrorKind::IllegalParamNumber {
                            name: name.to_owned(),
                        }));
                    }
                }
            }
            Some(c) => {
                parser.i += c.len_utf8();
                let text = delimiters.last_mut();
                if let Some(text) = text {
                    text.push(c);
                    if c == '\\' {
                        let cs = parser.get_cs();
                        text.push_str(&cs);
                    }
                }
            }
        }
    }
    if delimiters.iter().all(String::is_empty) {
        delimiters.clear();
    }
    Ok((params, delimiters))
}

/// `\def\name<template>{body}` and `\gdef`.
fn def(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let global = parser.state.take_global() || spec.arg(0) == "global";
    let cs = macro_name(parser, name)?;
    let (params, delimiters) = template(parser, name)?;
    let body = parser.get_argument(name, false)?;
    let def = MacroDef {
        body,
        params,
        default: None,
        delimiters,
    };
    define(parser, &cs, Some(Definition::Macro(def)), global)
}

/// `\global`: makes the following definition global.
fn global(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    parser.skip_spaces();
    let next = if parser.peek() == Some('\\') {
        parser.i += 1;
        parser.get_cs()
    } else {
        String::new()
    };
    let target = match parser.state.namespace.get(&next) {
        Some(Definition::Alias(target)) => target.clone(),
        _ => next.clone(),
    };
    if !PREFIXABLE.contains(target.as_str()) {
        let token = if next.is_empty() {
            parser.peek().map(String::from).unwrap_or_else(|| name.to_owned())
        } else {
            format!("\\{next}")
        };
        return Err(parser.error(ParseErrorKind::InvalidTokenAfterMacroPrefix { token }));
    }
    parser.state.set_global();
    parser.dispatch_cs(&next)
}

/// `\let\name=<token>`: copies the current meaning of a control sequence
/// or character.
fn let_(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let global = parser.state.take_global();
    let cs = macro_name(parser, name)?;
    if parser.get_next() == Some('=') {
        parser.i += 1;
    }
    let meaning = match parser.get_next() {
        None => {
            return Err(parser.error(ParseErrorKind::MissingArgFor {
                name: name.to_owned(),
            }));
        }
        Some('\\') => {
            parser.i += 1;
            let target = parser.get_cs();
            match parser.state.namespace.get(&target) {
                Some(def) => Some(def.clone()),
                None if parser.config.macro_spec(&target).is_some() => {
                    Some(Definition::Alias(target))
                }
                None => None,
            }
        }
        Some(c) => {
            parser.i += c.len_utf8();
            Some(Definition::Char(c))
        }
    };
    define(parser, &cs, meaning, global)
}

/// `\newcommand\name[n][default]{body}` and its variants.
fn new_command(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let cs = macro_name(parser, name)?;
    let count = parser.get_brackets(name)?;
    let params = param_count(parser, name, count.as_deref())?;
    let default = parser.get_brackets(name)?;
    let body = parser.get_argument(name, false)?;
    let exists = parser.state.namespace.has(&cs) || parser.config.macro_spec(&cs).is_some();
    match spec.arg(0) {
        "new" if exists => {
            return Err(parser.error(ParseErrorKind::NewcommandRedefinition {
                name: format!("\\{cs}"),
            }));
        }
        "renew" if !exists => {
            return Err(parser.error(ParseErrorKind::RenewcommandNonexistent {
                name: format!("\\{cs}"),
            }));
        }
        "provide" if exists => return Ok(()),
        _ => {}
    }
    let def = MacroDef {
        body,
        params,
        default,
        delimiters: Vec::new(),
    };
    define(parser, &cs, Some(Definition::Macro(def)), false)
}

/// `\newenvironment{name}[n][default]{begin}{end}` and
/// `\renewenvironment`.
fn new_environment(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()> {
    let env = parser.get_argument(name, false)?;
    let env = env.trim().to_owned();
    if env.is_empty() || env.contains(['\\', '{', '}']) {
        return Err(parser.error(ParseErrorKind::InvalidEnv { name: env }));
    }
    let count = parser.get_brackets(name)?;
    let params = param_count(parser, name, count.as_deref())?;
    let default = parser.get_brackets(name)?;
    let begin = parser.get_argument(name, false)?;
    let end = parser.get_argument(name, false)?;
    let key = env_key(&env);
    let exists = parser.state.namespace.has(&key) || parser.config.environment(&env).is_some();
    match spec.arg(0) {
        "new" if exists => {
            return Err(parser.error(ParseErrorKind::NewcommandRedefinition { name: env }));
        }
        "renew" if !exists => {
            return Err(parser.error(ParseErrorKind::RenewcommandNonexistent { name: env }));
        }
        _ => {}
    }
    let def = EnvironmentDef {
        begin,
        end,
        params,
        default,
    };
    define(parser, &key, Some(Definition::Environment(def)), false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables() {
        assert!(PREFIXABLE.contains("gdef"));
        assert!(!PREFIXABLE.contains("newcommand"));
        assert_eq!(COMMANDS.get("gdef").map(|spec| spec.arg(0)), Some("global"));
    }
}
