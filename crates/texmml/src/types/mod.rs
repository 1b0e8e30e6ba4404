//! Core type definitions shared across the engine

mod parse_error;
mod settings;
mod source_location;

pub use parse_error::{ErrorCategory, ErrorLocationProvider, ParseError, ParseErrorKind};
pub use settings::{Settings, TagSide};
pub use source_location::SourceLocation;

use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The four kinds of handler tables a package can contribute.
///
/// A lookup is always scoped to one handler type; identically named bindings
/// in different types never interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum HandlerType {
    /// Single input characters and character classes.
    Character,
    /// Names accepted after `\left`, `\right` and friends.
    Delimiter,
    /// Control sequence names (without the leading backslash).
    Macro,
    /// Environment names used with `\begin`/`\end`.
    Environment,
}

/// TeX spacing class of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TexClass {
    /// Ordinary symbol.
    Ord,
    /// Large operator.
    Op,
    /// Binary operator.
    Bin,
    /// Relation.
    Rel,
    /// Opening delimiter.
    Open,
    /// Closing delimiter.
    Close,
    /// Punctuation.
    Punct,
    /// Delimited sub-formula.
    Inner,
    /// Vertically centered box.
    Vcenter,
    /// No spacing class.
    None,
}

/// The `mathvariant` a token is rendered in.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Variant {
    Normal,
    Bold,
    Italic,
    BoldItalic,
    DoubleStruck,
    Script,
    Fraktur,
    SansSerif,
    Monospace,
    #[strum(serialize = "-tex-calligraphic")]
    Calligraphic,
}

/// Child slot of a script node that a pending script fills.
///
/// The discriminant is the index of the slot in `msubsup` (and
/// `munderover`) children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ScriptPosition {
    /// Subscript, or the limit below an operator.
    Sub = 1,
    /// Superscript, or the limit above an operator.
    Sup = 2,
}

impl ScriptPosition {
    /// Index of the slot among the children of the script node.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}
