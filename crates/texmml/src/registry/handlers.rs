//! Handler maps and the handler specifications they bind.

use crate::namespace::KeyMap;
use crate::parser::TexParser;
use crate::retry::ParseResult;
use crate::stack::StackItem;
use crate::types::TexClass;

/// Parses one input character.
pub type CharacterHandler =
    fn(parser: &mut TexParser<'_>, c: char, spec: &CharacterSpec) -> ParseResult<()>;

/// Parses a control sequence. `name` includes the leading backslash.
pub type MacroHandler =
    fn(parser: &mut TexParser<'_>, name: &str, spec: &MacroSpec) -> ParseResult<()>;

/// Opens an environment. `begin` is the already built begin item, with its
/// environment name set; the handler decides what to push.
pub type EnvironmentHandler =
    fn(parser: &mut TexParser<'_>, begin: StackItem, spec: &EnvironmentSpec) -> ParseResult<()>;

/// Binding for a character or character class.
#[derive(Debug, Clone, Copy)]
pub struct CharacterSpec {
    /// Handler to run.
    pub handler: CharacterHandler,
    /// Replacement text, if the handler uses one.
    pub text: &'static str,
    /// Spacing class of the produced token, if fixed.
    pub class: Option<TexClass>,
}

/// Binding for a control sequence.
#[derive(Debug, Clone, Copy)]
pub struct MacroSpec {
    /// Handler to run.
    pub handler: MacroHandler,
    /// Symbol or replacement text the handler works with.
    pub text: &'static str,
    /// Extra handler parameters.
    pub args: &'static [&'static str],
}

impl MacroSpec {
    /// A binding without parameters.
    #[must_use]
    pub const fn new(handler: MacroHandler) -> Self {
        Self {
            handler,
            text: "",
            args: &[],
        }
    }

    /// A binding carrying a symbol or replacement text.
    #[must_use]
    pub const fn text(handler: MacroHandler, text: &'static str) -> Self {
        Self {
            handler,
            text,
            args: &[],
        }
    }

    /// A binding carrying handler parameters.
    #[must_use]
    pub const fn args(handler: MacroHandler, args: &'static [&'static str]) -> Self {
        Self {
            handler,
            text: "",
            args,
        }
    }

    /// Parameter `index`, or the empty string.
    #[must_use]
    pub fn arg(&self, index: usize) -> &'static str {
        self.args.get(index).copied().unwrap_or_default()
    }
}

/// Binding for an environment name.
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentSpec {
    /// Handler to run on `\begin`.
    pub handler: EnvironmentHandler,
    /// Extra handler parameters.
    pub args: &'static [&'static str],
}

impl EnvironmentSpec {
    /// Parameter `index`, or the empty string.
    #[must_use]
    pub fn arg(&self, index: usize) -> &'static str {
        self.args.get(index).copied().unwrap_or_default()
    }
}

/// A delimiter accepted by `\left`, `\right` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimiterSpec {
    /// Text of the operator node. Empty for the null delimiter `.`.
    pub text: &'static str,
}

/// Result of [`Configuration::lookup`](super::Configuration::lookup).
#[derive(Debug, Clone, Copy)]
pub enum Binding<'a> {
    /// A character binding.
    Character(&'a CharacterSpec),
    /// A control sequence binding.
    Macro(&'a MacroSpec),
    /// An environment binding.
    Environment(&'a EnvironmentSpec),
    /// A delimiter binding.
    Delimiter(&'a DelimiterSpec),
}

/// A named table of bindings of one handler type.
#[derive(Debug, Clone)]
pub struct HandlerMap<T> {
    name: String,
    entries: KeyMap<String, T>,
    classes: Vec<(fn(char) -> bool, T)>,
}

impl<T> HandlerMap<T> {
    /// An empty map.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            entries: KeyMap::default(),
            classes: Vec::new(),
        }
    }

    /// Builder-style [`HandlerMap::insert`].
    #[must_use]
    pub fn with(mut self, key: &str, spec: T) -> Self {
        self.insert(key, spec);
        self
    }

    /// Binds every character accepted by `predicate`. Class bindings are only
    /// consulted when no exact binding matches.
    #[must_use]
    pub fn with_class(mut self, predicate: fn(char) -> bool, spec: T) -> Self {
        self.classes.push((predicate, spec));
        self
    }

    /// Binds `key`.
    pub fn insert(&mut self, key: &str, spec: T) {
        self.entries.insert(key.to_owned(), spec);
    }

    /// Binding of `key` in this map.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    /// Map name, used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact bindings.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &T)> {
        self.entries.iter()
    }

    /// Class bindings, in insertion order.
    #[must_use]
    pub fn classes(&self) -> &[(fn(char) -> bool, T)] {
        &self.classes
    }

    /// Number of exact bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map binds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.classes.is_empty()
    }
}

impl<T: Copy> HandlerMap<T> {
    /// Binds every entry of a static table through `make`.
    #[must_use]
    pub fn from_table<V: Copy>(
        name: &str,
        table: &phf::Map<&'static str, V>,
        make: fn(V) -> T,
    ) -> Self {
        let mut map = Self::new(name);
        for (key, value) in table {
            map.insert(key, make(*value));
        }
        map
    }
}
