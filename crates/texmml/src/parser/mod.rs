//! The scanner and dispatcher.
//!
//! A [`TexParser`] walks its input one character at a time. Every character
//! is looked up in the character maps of the [`Configuration`] and handed to
//! the bound handler; the backslash handler reads a control sequence name and
//! comes back through [`TexParser::dispatch_cs`], which consults user
//! definitions first, then the macro maps, then the autoload table.
//!
//! Handlers consume their arguments with the primitives defined here
//! ([`TexParser::get_argument`], [`TexParser::get_brackets`],
//! [`TexParser::get_dimen`], ...) and push [`StackItem`]s. Arguments that are
//! themselves math are parsed by a nested parser over the argument text,
//! sharing the configuration and the [`ParseState`] of the top-level parse
//! but running inside its own namespace group.
//!
//! # Provenance
//!
//! Every finished node pushed by a handler is stamped with the source text
//! consumed by the dispatch that produced it. Reductions that reorder their
//! pieces (scripts, fractions, fences) compose their own provenance.

mod definition;

pub use definition::{
    Definition, EnvironmentDef, MacroDef, ends_with_control_word, env_key, substitute,
};

use core::ops::{Deref, DerefMut};

use log::trace;

use crate::lexer;
use crate::namespace::{KeyMap, Namespace};
use crate::node::{MmlNode, NodeKind};
use crate::registry::Configuration;
use crate::retry::{Halt, ParseResult, Resolution};
use crate::stack::{ItemKind, Reduce, Stack, StackItem, StackItemFactory};
use crate::tags::TagManager;
use crate::types::{ParseError, ParseErrorKind, Settings, SourceLocation, Variant};

/// Inherited parsing environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParseEnv {
    /// Display (block) math.
    pub display: bool,
    /// Nested parse of an argument or sub-expression.
    pub inner: bool,
    /// Font selected by `\rm`, `\bf`, `\mathbb`, ...
    pub font: Option<Variant>,
    /// Script nesting depth.
    pub script_level: u8,
}

impl ParseEnv {
    /// Top-level display math.
    #[must_use]
    pub const fn display() -> Self {
        Self {
            display: true,
            inner: false,
            font: None,
            script_level: 0,
        }
    }

    /// Top-level inline math.
    #[must_use]
    pub const fn inline() -> Self {
        Self {
            display: false,
            inner: false,
            font: None,
            script_level: 0,
        }
    }
}

/// Mutable state of one top-level parse attempt, shared by the nested
/// parsers it spawns and discarded when the attempt ends without success.
#[derive(Debug)]
pub struct ParseState {
    /// Definitions visible to the parse.
    pub namespace: Namespace<Definition>,
    /// Equation numbering.
    pub tags: TagManager,
    /// Colors made with `\definecolor`, by name.
    pub colors: KeyMap<String, String>,
    macro_count: usize,
    nesting: usize,
    global_prefix: bool,
    closing: Vec<String>,
}

impl ParseState {
    /// State over an already prepared namespace and tag manager.
    #[must_use]
    pub fn new(
        namespace: Namespace<Definition>,
        tags: TagManager,
        colors: KeyMap<String, String>,
    ) -> Self {
        Self {
            namespace,
            tags,
            colors,
            macro_count: 0,
            nesting: 0,
            global_prefix: false,
            closing: Vec::new(),
        }
    }

    /// Marks the next definition as global (`\global`).
    pub const fn set_global(&mut self) {
        self.global_prefix = true;
    }

    /// Consumes the `\global` prefix, if one is pending.
    pub const fn take_global(&mut self) -> bool {
        core::mem::replace(&mut self.global_prefix, false)
    }

    /// Macro substitutions performed so far.
    #[must_use]
    pub const fn macro_count(&self) -> usize {
        self.macro_count
    }

    /// Opens a namespace group that is closed, together with anything left
    /// open inside it, when the guard drops.
    pub fn scoped(&mut self) -> StateGuard<'_> {
        let depth = self.namespace.depth();
        self.namespace.begin_group();
        self.nesting += 1;
        StateGuard { state: self, depth }
    }

    /// Splits the state into namespace, tag manager and colors.
    #[must_use]
    pub fn into_parts(self) -> (Namespace<Definition>, TagManager, KeyMap<String, String>) {
        (self.namespace, self.tags, self.colors)
    }
}

/// Guard returned by [`ParseState::scoped`].
#[derive(Debug)]
pub struct StateGuard<'s> {
    state: &'s mut ParseState,
    depth: usize,
}

impl Deref for StateGuard<'_> {
    type Target = ParseState;

    fn deref(&self) -> &Self::Target {
        self.state
    }
}

impl DerefMut for StateGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.state
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        self.state.nesting -= 1;
        self.state.namespace.unwind_to(self.depth);
    }
}

/// The scanner/driver over one input string.
pub struct TexParser<'a> {
    /// Text being scanned. Macro expansion rewrites it in place.
    pub string: String,
    /// Scan position, in bytes.
    pub i: usize,
    /// The item stack.
    pub stack: Stack,
    /// State shared with the other parsers of this attempt.
    pub state: &'a mut ParseState,
    /// Merged handler tables.
    pub config: &'a Configuration,
    /// Engine settings.
    pub settings: &'a Settings,
    /// Start of the command being dispatched.
    start: usize,
    /// Namespace depth at creation.
    depth: usize,
}

impl<'a> TexParser<'a> {
    /// A parser over `text` starting in `env`.
    pub fn new(
        text: &str,
        env: ParseEnv,
        state: &'a mut ParseState,
        config: &'a Configuration,
        settings: &'a Settings,
    ) -> Self {
        let mut base = StackItem::new(ItemKind::Start { inner: env.inner });
        base.env = env;
        let depth = state.namespace.depth();
        Self {
            string: text.to_owned(),
            i: 0,
            stack: Stack::new(base),
            state,
            config,
            settings,
            start: 0,
            depth,
        }
    }

    /// Parses the whole input into one node.
    pub fn parse(mut self) -> ParseResult<MmlNode> {
        while self.i < self.string.len() {
            self.dispatch()?;
        }
        self.start = self.i;
        self.push(StackItem::new(ItemKind::Stop))?;
        let open = self.state.namespace.depth().saturating_sub(self.depth);
        if open > 0 {
            return Err(self.error(ParseErrorKind::UnclosedGroups { count: open }));
        }
        match self.stack.pop() {
            Some(mut item) if item.is_final() && self.stack.is_empty() => item
                .nodes
                .pop()
                .ok_or_else(|| self.error(ParseErrorKind::ExtraOpenMissingClose)),
            _ => Err(self.error(ParseErrorKind::ExtraOpenMissingClose)),
        }
    }

    fn dispatch(&mut self) -> ParseResult<()> {
        self.start = self.i;
        match self.next_char() {
            Some(c) => self.dispatch_char(c),
            None => Ok(()),
        }
    }

    /// Runs the handler bound to `c`.
    pub fn dispatch_char(&mut self, c: char) -> ParseResult<()> {
        let Some(spec) = self.config.character(c).copied() else {
            return Err(self.error(ParseErrorKind::Misplaced {
                name: c.to_string(),
            }));
        };
        (spec.handler)(self, c, &spec).map_err(|halt| self.locate(halt))
    }

    /// Reads a control sequence name after a backslash and runs it.
    pub fn control_sequence(&mut self) -> ParseResult<()> {
        let name = self.get_cs();
        self.dispatch_cs(&name)
    }

    /// Runs the control sequence `name` (without backslash): a user
    /// definition if there is one, else the bound macro handler.
    pub fn dispatch_cs(&mut self, name: &str) -> ParseResult<()> {
        match self.state.namespace.get(name).cloned() {
            Some(Definition::Macro(def)) => self.use_macro(name, &def),
            Some(Definition::Alias(target)) => self.builtin(&target, name),
            Some(Definition::Char(c)) => self.dispatch_char(c),
            Some(Definition::Environment(_)) | None => self.builtin(name, name),
        }
    }

    fn builtin(&mut self, name: &str, shown: &str) -> ParseResult<()> {
        if let Some(spec) = self.config.macro_spec(name).copied() {
            trace!("dispatch \\{name}");
            return (spec.handler)(self, &format!("\\{shown}"), &spec);
        }
        if let Some(package) = self.config.autoload(name) {
            return Err(Halt::Suspend(Resolution::Package(package.to_owned())));
        }
        Err(self.error(ParseErrorKind::UndefinedControlSequence {
            name: format!("\\{shown}"),
        }))
    }

    fn use_macro(&mut self, name: &str, def: &MacroDef) -> ParseResult<()> {
        let cs = format!("\\{name}");
        let args = if def.delimiters.is_empty() {
            self.get_macro_args(&cs, def.params, def.default.as_deref())?
        } else {
            self.get_delimited_args(&cs, def)?
        };
        let body = substitute(&def.body, &args);
        trace!("expanding {cs} into '{body}'");
        self.expand(&body)
    }

    /// Reads `params` arguments of a user macro or environment; the first is
    /// optional when it has a default.
    pub fn get_macro_args(
        &mut self,
        name: &str,
        params: usize,
        default: Option<&str>,
    ) -> ParseResult<Vec<String>> {
        let mut args = Vec::with_capacity(params);
        for n in 0..params {
            let arg = match default {
                Some(default) if n == 0 => self
                    .get_brackets(name)?
                    .unwrap_or_else(|| default.to_owned()),
                _ => self.get_argument(name, false)?,
            };
            args.push(arg);
        }
        Ok(args)
    }

    fn get_delimited_args(&mut self, cs: &str, def: &MacroDef) -> ParseResult<Vec<String>> {
        let prefix = def.delimiters.first().map_or("", String::as_str);
        if !prefix.is_empty() {
            if !self.rest().starts_with(prefix) {
                return Err(self.error(ParseErrorKind::MismatchUseDef {
                    name: cs.to_owned(),
                }));
            }
            self.i += prefix.len();
        }
        let mut args = Vec::with_capacity(def.params);
        for delim in def.delimiters.iter().skip(1) {
            if delim.is_empty() {
                args.push(self.get_argument(cs, false)?);
                continue;
            }
            let arg = self.get_up_to(cs, delim).map_err(|halt| match halt {
                Halt::Error(err)
                    if matches!(*err.kind, ParseErrorKind::TokenNotFoundForCommand { .. }) =>
                {
                    self.error(ParseErrorKind::RunawayArgument {
                        name: cs.to_owned(),
                    })
                }
                other => other,
            })?;
            args.push(strip_braces(&arg).to_owned());
        }
        Ok(args)
    }

    /// Replaces the text consumed by the current command with `replacement`
    /// and rescans from there.
    pub fn expand(&mut self, replacement: &str) -> ParseResult<()> {
        self.state.macro_count += 1;
        if self.state.macro_count > self.settings.max_macros {
            return Err(self.error(ParseErrorKind::MaxMacroSub));
        }
        let rest = &self.string[self.i..];
        let mut text = String::with_capacity(replacement.len() + rest.len() + 1);
        text.push_str(replacement);
        if ends_with_control_word(replacement) && rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
            text.push(' ');
        }
        text.push_str(rest);
        if text.len() > self.settings.max_buffer {
            return Err(self.error(ParseErrorKind::MaxBufferSize));
        }
        self.string.truncate(self.start);
        self.string.push_str(&text);
        self.i = self.start;
        Ok(())
    }

    /// Opens the environment `name` (after `\begin{name}` was read).
    pub fn begin_environment(&mut self, name: &str) -> ParseResult<()> {
        let begin = StackItem::new(ItemKind::Begin {
            name: name.to_owned(),
        });
        if let Some(Definition::Environment(def)) = self.state.namespace.get(&env_key(name)).cloned() {
            let cs = format!("\\begin{{{name}}}");
            let args = self.get_macro_args(&cs, def.params, def.default.as_deref())?;
            let end = substitute(&def.end, &args);
            self.push(begin.with_property("end", &end))?;
            return self.expand(&substitute(&def.begin, &args));
        }
        match self.config.environment(name).copied() {
            Some(spec) => {
                trace!("environment {name}");
                (spec.handler)(self, begin, &spec)
            }
            None => Err(self.error(ParseErrorKind::UnknownEnv {
                name: name.to_owned(),
            })),
        }
    }

    /// Closes the environment `name` (after `\end{name}` was read). A user
    /// environment first rescans its end text followed by the `\end` again.
    pub fn end_environment(&mut self, name: &str) -> ParseResult<()> {
        if let Some(Definition::Environment(def)) = self.state.namespace.get(&env_key(name)).cloned()
            && self.state.closing.last().map(String::as_str) != Some(name)
        {
            let end = match self.stack.top() {
                Some(top) if matches!(&top.kind, ItemKind::Begin { name: open } if open == name) => {
                    top.property("end").map_or_else(|| def.end.clone(), str::to_owned)
                }
                _ => def.end.clone(),
            };
            self.state.closing.push(name.to_owned());
            return self.expand(&format!("{end}\\end{{{name}}}"));
        }
        if self.state.closing.last().map(String::as_str) == Some(name) {
            self.state.closing.pop();
        }
        self.push(StackItem::new(ItemKind::End {
            name: name.to_owned(),
        }))?;
        self.end_group()
    }

    /// Opens a namespace group.
    pub fn begin_group(&mut self) {
        self.state.namespace.begin_group();
    }

    /// Closes the innermost namespace group.
    pub fn end_group(&mut self) -> ParseResult<()> {
        self.state
            .namespace
            .end_group()
            .map_err(|err| Halt::Error(err.located(&self.here())))
    }

    /// Offers `item` to the stack, stamping it with the current command's
    /// span.
    pub fn push(&mut self, mut item: StackItem) -> ParseResult<()> {
        item.start = self.start;
        item.content = self.i;
        if item.is_final() {
            let source = self.source(self.start, self.i);
            for node in &mut item.nodes {
                if node.provenance.is_none() && !node.inferred {
                    node.provenance.clone_from(&source);
                }
            }
        }
        let mut cx = Reduce {
            text: &self.string,
            start: self.start,
            pos: self.i,
            tags: &mut self.state.tags,
        };
        self.stack
            .push(item, &mut cx)
            .map_err(|err| Halt::Error(err.located(&self.here())))
    }

    /// Pushes a finished node.
    pub fn push_node(&mut self, node: MmlNode) -> ParseResult<()> {
        self.push(StackItem::mml(node))
    }

    /// A fresh stack item of a named kind.
    pub fn item(&self, kind: &str) -> ParseResult<StackItem> {
        StackItemFactory::new(self.config)
            .create(kind)
            .map_err(Halt::from)
    }

    /// Environment of the innermost open item.
    #[must_use]
    pub fn env(&self) -> ParseEnv {
        self.stack.top().map(|top| top.env).unwrap_or_default()
    }

    /// Changes the environment of the innermost open item.
    pub fn update_env<F: FnOnce(&mut ParseEnv)>(&mut self, update: F) {
        if let Some(top) = self.stack.top_mut() {
            update(&mut top.env);
        }
    }

    /// A token element in the current font.
    #[must_use]
    pub fn token(&self, kind: NodeKind, text: &str) -> MmlNode {
        let mut node = MmlNode::token(kind, text);
        if let Some(font) = self.env().font {
            node.set_attr("mathvariant", font.as_ref());
        }
        node
    }

    /// Trimmed source between two offsets, if there is any.
    #[must_use]
    pub fn source(&self, from: usize, to: usize) -> Option<String> {
        self.string
            .get(from..to)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    }

    /// Source consumed so far by the command being dispatched.
    #[must_use]
    pub fn consumed(&self) -> Option<String> {
        self.source(self.start, self.i)
    }

    /// Span of the command being dispatched.
    #[must_use]
    pub fn here(&self) -> SourceLocation {
        SourceLocation::from_str(&self.string, self.start, self.i.max(self.start))
    }

    /// A classified error at the current command.
    #[must_use]
    pub fn error(&self, kind: ParseErrorKind) -> Halt {
        ParseError::with_token(kind, &self.here()).into()
    }

    fn locate(&self, halt: Halt) -> Halt {
        match halt {
            Halt::Error(err) => Halt::Error(err.located(&self.here())),
            suspend @ Halt::Suspend(_) => suspend,
        }
    }

    // --- scanning primitives ---

    /// Unscanned input.
    #[must_use]
    pub fn rest(&self) -> &str {
        &self.string[self.i..]
    }

    /// Character at the scan position.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes one character.
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.i += c.len_utf8();
        Some(c)
    }

    /// Skips whitespace.
    pub fn skip_spaces(&mut self) {
        if let Some(len) = lexer::match_space(self.rest()) {
            self.i += len;
        }
    }

    /// Next non-space character, not consumed.
    pub fn get_next(&mut self) -> Option<char> {
        self.skip_spaces();
        self.peek()
    }

    /// Control sequence name at the scan position, which is right after the
    /// backslash.
    pub fn get_cs(&mut self) -> String {
        let (name, len) = lexer::scan_cs_name(self.rest());
        let name = name.to_owned();
        self.i += len;
        name
    }

    /// Consumes a `*` if one follows.
    pub fn get_star(&mut self) -> bool {
        let star = self.get_next() == Some('*');
        if star {
            self.i += 1;
        }
        star
    }

    /// A TeX argument: the contents of a brace group, a control sequence, or
    /// a single character. With `no_error` a missing argument is empty.
    pub fn get_argument(&mut self, name: &str, no_error: bool) -> ParseResult<String> {
        match self.get_next() {
            None if no_error => Ok(String::new()),
            None => Err(self.error(ParseErrorKind::MissingArgFor {
                name: name.to_owned(),
            })),
            Some('}') if no_error => Ok(String::new()),
            Some('}') => Err(self.error(ParseErrorKind::ExtraCloseMissingOpen)),
            Some('\\') => {
                self.i += 1;
                Ok(format!("\\{}", self.get_cs()))
            }
            Some('{') => {
                let begin = self.i + 1;
                let end = self
                    .matching_brace(begin)
                    .ok_or_else(|| self.error(ParseErrorKind::MissingCloseBrace))?;
                self.i = end + 1;
                Ok(self.string[begin..end].to_owned())
            }
            Some(c) => {
                self.i += c.len_utf8();
                Ok(c.to_string())
            }
        }
    }

    fn matching_brace(&self, from: usize) -> Option<usize> {
        let mut depth = 1_usize;
        let mut chars = self.string[from..].char_indices();
        while let Some((k, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(from + k);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// An optional `[...]` argument. Brackets inside braces do not end it.
    pub fn get_brackets(&mut self, name: &str) -> ParseResult<Option<String>> {
        if self.get_next() != Some('[') {
            return Ok(None);
        }
        let begin = self.i + 1;
        let mut depth = 0_usize;
        let mut chars = self.string[begin..].char_indices();
        while let Some((k, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '{' => depth += 1,
                '}' if depth == 0 => {
                    return Err(self.error(ParseErrorKind::ExtraCloseLooking {
                        token: "']'".to_owned(),
                    }));
                }
                '}' => depth -= 1,
                ']' if depth == 0 => {
                    let arg = self.string[begin..begin + k].to_owned();
                    self.i = begin + k + 1;
                    return Ok(Some(arg));
                }
                _ => {}
            }
        }
        Err(self.error(ParseErrorKind::MissingCloseBracket {
            name: name.to_owned(),
        }))
    }

    /// A delimiter token, resolved through the delimiter maps. The null
    /// delimiter `.` resolves to the empty string.
    pub fn get_delimiter(&mut self, name: &str) -> ParseResult<&'static str> {
        let token = match self.get_next() {
            Some('\\') => {
                self.i += 1;
                format!("\\{}", self.get_cs())
            }
            Some(c) => {
                self.i += c.len_utf8();
                c.to_string()
            }
            None => String::new(),
        };
        self.config
            .delimiter(&token)
            .map(|delim| delim.text)
            .ok_or_else(|| {
                self.error(ParseErrorKind::MissingOrUnrecognizedDelim {
                    name: name.to_owned(),
                })
            })
    }

    /// A dimension, either braced or inline (`1.5em`), as CSS text.
    pub fn get_dimen(&mut self, name: &str) -> ParseResult<String> {
        if self.get_next() == Some('{') {
            let arg = self.get_argument(name, false)?;
            if let Some(dimen) = lexer::match_dimen(&arg, false) {
                return Ok(dimen.to_css());
            }
        } else if let Some(dimen) = lexer::match_dimen(self.rest(), true) {
            self.i += dimen.len;
            return Ok(dimen.to_css());
        }
        Err(self.error(ParseErrorKind::MissingDimOrUnits {
            name: name.to_owned(),
        }))
    }

    /// Raw text up to `token`, which is consumed. Braces are balanced; the
    /// token is only recognized outside of them.
    pub fn get_up_to(&mut self, name: &str, token: &str) -> ParseResult<String> {
        self.skip_spaces();
        let begin = self.i;
        let mut depth = 0_usize;
        loop {
            let k = self.i;
            if depth == 0 && self.string[k..].starts_with(token) && !self.continues_word(k, token) {
                self.i = k + token.len();
                return Ok(self.string[begin..k].to_owned());
            }
            let Some(c) = self.next_char() else {
                return Err(self.error(ParseErrorKind::TokenNotFoundForCommand {
                    token: token.to_owned(),
                    name: name.to_owned(),
                }));
            };
            match c {
                '\\' => {
                    self.next_char();
                }
                '{' => depth += 1,
                '}' if depth == 0 => {
                    return Err(self.error(ParseErrorKind::ExtraCloseLooking {
                        token: token.to_owned(),
                    }));
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
    }

    /// Whether a control word `token` found at `at` is really the prefix of
    /// a longer control word.
    fn continues_word(&self, at: usize, token: &str) -> bool {
        token.starts_with('\\')
            && token.ends_with(|c: char| c.is_ascii_alphabetic())
            && self.string[at + token.len()..]
                .starts_with(|c: char| c.is_ascii_alphabetic())
    }

    // --- nested parses ---

    /// Parses `text` in a nested parser and namespace group.
    pub fn sub_parse(&mut self, text: &str, env: ParseEnv) -> ParseResult<MmlNode> {
        if self.state.nesting >= self.settings.max_nesting {
            return Err(self.error(ParseErrorKind::MaxNesting));
        }
        let env = ParseEnv { inner: true, ..env };
        let mut state = self.state.scoped();
        TexParser::new(text, env, &mut state, self.config, self.settings).parse()
    }

    /// Parses the next argument as math.
    pub fn parse_arg(&mut self, name: &str) -> ParseResult<MmlNode> {
        let text = self.get_argument(name, false)?;
        self.sub_parse(&text, self.env())
    }

    /// Parses the text up to `token` as math.
    pub fn parse_up_to(&mut self, name: &str, token: &str) -> ParseResult<MmlNode> {
        let text = self.get_up_to(name, token)?;
        self.sub_parse(&text, self.env())
    }
}

/// Strips one pair of braces enclosing the whole of `arg`.
fn strip_braces(arg: &str) -> &str {
    let inner = arg.trim();
    if inner.len() >= 2 && inner.starts_with('{') && inner.ends_with('}') {
        let body = &inner[1..inner.len() - 1];
        let mut depth = 0_i32;
        for c in body.chars() {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return arg;
            }
        }
        return body;
    }
    arg
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::*;
    use crate::tags::no_tags;

    fn state() -> ParseState {
        ParseState::new(
            Namespace::default(),
            TagManager::new(Arc::from(no_tags()), &Settings::default()),
            KeyMap::default(),
        )
    }

    fn with_parser<T>(text: &str, f: impl FnOnce(&mut TexParser<'_>) -> T) -> T {
        let config = Configuration::default();
        let settings = Settings::default();
        let mut state = state();
        let mut parser = TexParser::new(text, ParseEnv::default(), &mut state, &config, &settings);
        f(&mut parser)
    }

    #[test]
    fn test_get_argument() {
        with_parser(" {a{b}c} x \\alpha y", |p| {
            assert_eq!(p.get_argument("\\f", false).unwrap(), "a{b}c");
            assert_eq!(p.get_argument("\\f", false).unwrap(), "x");
            assert_eq!(p.get_argument("\\f", false).unwrap(), "\\alpha");
            assert_eq!(p.get_argument("\\f", false).unwrap(), "y");
            assert_eq!(p.get_argument("\\f", true).unwrap(), "");
            assert!(p.get_argument("\\f", false).is_err());
        });
        with_parser("{ab", |p| {
            let Err(Halt::Error(err)) = p.get_argument("\\f", false) else {
                panic!("expected an error");
            };
            assert_eq!(err.id(), "MissingCloseBrace");
        });
    }

    #[test]
    fn test_get_brackets() {
        with_parser("[a{]}b]c", |p| {
            assert_eq!(p.get_brackets("\\sqrt").unwrap().as_deref(), Some("a{]}b"));
            assert_eq!(p.rest(), "c");
            assert_eq!(p.get_brackets("\\sqrt").unwrap(), None);
        });
        with_parser("[ab", |p| {
            assert!(p.get_brackets("\\sqrt").is_err());
        });
    }

    #[test]
    fn test_get_up_to() {
        with_parser("a{\\right}b\\right)", |p| {
            assert_eq!(p.get_up_to("\\left", "\\right").unwrap(), "a{\\right}b");
            assert_eq!(p.rest(), ")");
        });
        with_parser("a\\rightarrow b", |p| {
            let Err(Halt::Error(err)) = p.get_up_to("\\left", "\\right") else {
                panic!("expected an error");
            };
            assert_eq!(err.id(), "TokenNotFoundForCommand");
        });
    }

    #[test]
    fn test_get_dimen() {
        with_parser("-1.5em x", |p| {
            assert_eq!(p.get_dimen("\\raise").unwrap(), "-1.5em");
            assert_eq!(p.rest(), "x");
        });
        with_parser("{.5 pt}", |p| {
            assert_eq!(p.get_dimen("\\raise").unwrap(), "0.5pt");
        });
        with_parser("{5}", |p| {
            assert!(p.get_dimen("\\raise").is_err());
        });
    }

    #[test]
    fn test_expand_rewrites_input() {
        with_parser("\\foo bar", |p| {
            p.i = 5;
            p.expand("\\alpha").unwrap();
            assert_eq!(p.string, "\\alpha bar");
            assert_eq!(p.i, 0);
            assert_eq!(p.state.macro_count(), 1);
        });
    }

    #[test]
    fn test_strip_braces() {
        assert_eq!(strip_braces("{ab}"), "ab");
        assert_eq!(strip_braces("{a}{b}"), "{a}{b}");
        assert_eq!(strip_braces("ab"), "ab");
    }
}
