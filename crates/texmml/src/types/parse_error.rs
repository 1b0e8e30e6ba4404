//! Classified parse errors.
//!
//! Every failure the engine can report is a [`ParseErrorKind`] variant. A
//! variant carries its substitution values as named fields; hosts that
//! localize messages use [`ParseErrorKind::id`] as the template name and
//! [`ParseErrorKind::args`] as the positional arguments.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use strum::{Display, EnumIter, IntoStaticStr};
use thiserror::Error;

use crate::types::SourceLocation;

/// Main error type returned when markup cannot be turned into a tree.
#[derive(Debug, Error)]
#[error("TeX parse error: {kind}{context}")]
pub struct ParseError {
    /// Categorised reason for the failure.
    #[source]
    pub kind: Box<ParseErrorKind>,
    /// Byte offset of the offending text in the scanned buffer, if known.
    pub position: Option<usize>,
    /// Length in bytes of the offending text, if known.
    pub length: Option<usize>,
    context: ParseErrorContext,
}

impl ParseError {
    /// Create a new error with no location.
    pub fn new<T: Into<ParseErrorKind>>(kind: T) -> Self {
        Self::from_kind(kind.into(), ParseErrorContext::None, None, None)
    }

    /// Create a new error pointing at the span reported by `token`.
    pub fn with_token<T: Into<ParseErrorKind>>(kind: T, token: &dyn ErrorLocationProvider) -> Self {
        let mut position = None;
        let mut length = None;
        let context = token.loc().filter(|loc| loc.start() <= loc.end()).map_or(
            ParseErrorContext::None,
            |loc| {
                position = Some(loc.start());
                length = Some(loc.end().saturating_sub(loc.start()));
                ParseErrorContext::Location(loc.clone())
            },
        );
        Self::from_kind(kind.into(), context, position, length)
    }

    fn from_kind(
        kind: ParseErrorKind,
        context: ParseErrorContext,
        position: Option<usize>,
        length: Option<usize>,
    ) -> Self {
        Self {
            kind: Box::new(kind),
            position,
            length,
            context,
        }
    }

    /// Attaches the span of `token` unless the error already points
    /// somewhere.
    #[must_use]
    pub fn located(self, token: &dyn ErrorLocationProvider) -> Self {
        if self.position.is_some() {
            return self;
        }
        Self::with_token(*self.kind, token)
    }

    /// Stable template identifier of the underlying kind.
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.kind.id()
    }

    /// Category of the underlying kind.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

impl From<strum::ParseError> for ParseError {
    fn from(err: strum::ParseError) -> Self {
        Self::new(ParseErrorKind::EnumParse(err))
    }
}

/// Broad class of a [`ParseErrorKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorCategory {
    /// Unbalanced or malformed markup.
    Structural,
    /// Well-formed markup that means nothing valid.
    Semantic,
    /// Equation numbering and labels.
    Numbering,
    /// Retry, scoping and sandbox protocol violations.
    Protocol,
}

/// Describes the specific reason for a [`ParseError`].
#[allow(missing_docs)]
#[derive(Debug, Error, IntoStaticStr)]
pub enum ParseErrorKind {
    // structural
    #[error("Extra close brace or missing open brace")]
    ExtraCloseMissingOpen,
    #[error("Extra open brace or missing close brace")]
    ExtraOpenMissingClose,
    #[error("Missing close brace")]
    MissingCloseBrace,
    #[error("Could not find closing ']' for argument to {name}")]
    MissingCloseBracket { name: String },
    #[error("Extra close brace while looking for {token}")]
    ExtraCloseLooking { token: String },
    #[error("Missing argument for {name}")]
    MissingArgFor { name: String },
    #[error("Missing dimension or its units for {name}")]
    MissingDimOrUnits { name: String },
    #[error("Bracket argument to {name} must be a dimension")]
    BracketMustBeDimension { name: String },
    #[error("Could not find {token} for {name}")]
    TokenNotFoundForCommand { token: String, name: String },
    #[error(r"Missing \begin{{{name}}} or extra \end{{{name}}}")]
    MissingBeginExtraEnd { name: String },
    #[error(r"Missing \end{{{name}}}")]
    EnvMissingEnd { name: String },
    #[error(r"\begin{{{begin}}} ended with \end{{{end}}}")]
    EnvBadEnd { begin: String, end: String },
    #[error(r"Missing \left or extra \right")]
    MissingLeftExtraRight,
    #[error(r"Extra \left or missing \right")]
    ExtraLeftMissingRight,
    #[error(r"Extra \middle")]
    ExtraMiddle,
    #[error("Missing superscript or subscript argument")]
    MissingScript,
    #[error("Missing open brace for superscript")]
    MissingOpenForSup,
    #[error("Missing open brace for subscript")]
    MissingOpenForSub,
    #[error("Double exponent: use braces to clarify")]
    DoubleExponent,
    #[error("Double subscripts: use braces to clarify")]
    DoubleSubscripts,
    #[error(r"Extra {name} or missing \begingroup")]
    ExtraEndMissingBegin { name: String },
    #[error(r"Missing \endgroup")]
    MissingEndgroup,
    #[error("Missing box for {name}")]
    MissingBoxFor { name: String },
    #[error("Expected '{expected}', got '{found}'")]
    ExpectedToken { expected: String, found: String },

    // semantic
    #[error(r"Undefined control sequence {name}")]
    UndefinedControlSequence { name: String },
    #[error("Unknown environment '{name}'")]
    UnknownEnv { name: String },
    #[error("Invalid environment name '{name}'")]
    InvalidEnv { name: String },
    #[error("Missing or unrecognized delimiter for {name}")]
    MissingOrUnrecognizedDelim { name: String },
    #[error("Illegal control sequence name for {name}")]
    IllegalControlSequenceName { name: String },
    #[error("Illegal number of parameters specified in {name}")]
    IllegalParamNumber { name: String },
    #[error("Parameters for {name} must be numbered sequentially")]
    SequentialParam { name: String },
    #[error("Use of {name} doesn't match its definition")]
    MismatchUseDef { name: String },
    #[error("Runaway argument for {name}?")]
    RunawayArgument { name: String },
    #[error("Maximum macro substitution count exceeded; is there a recursive macro call?")]
    MaxMacroSub,
    #[error("Internal buffer size exceeded; is there a recursive macro call?")]
    MaxBufferSize,
    #[error("Maximum nesting depth exceeded; is there a recursive macro call?")]
    MaxNesting,
    #[error(r"\newcommand{{{name}}} attempting to redefine {name}; use \renewcommand")]
    NewcommandRedefinition { name: String },
    #[error(r"\renewcommand{{{name}}} when {name} does not yet exist; use \newcommand")]
    RenewcommandNonexistent { name: String },
    #[error("{name} is protected and cannot be redefined")]
    ProtectedRedefinition { name: String },
    #[error("Invalid token after macro prefix: {token}")]
    InvalidTokenAfterMacroPrefix { token: String },
    #[error("Misplaced {name}")]
    Misplaced { name: String },
    #[error("Ambiguous use of {name}")]
    AmbiguousUseOf { name: String },
    #[error("Color model '{model}' not defined")]
    UndefinedColorModel { model: String },
    #[error("Invalid value '{value}' for the {model} color model")]
    InvalidColorValue { model: String, value: String },
    #[error("Erroneous nesting of equation structures")]
    ErroneousNestingEq,
    #[error("Unknown stack item kind '{kind}'")]
    UnknownItemKind { kind: String },
    #[error("Package '{name}' is not available")]
    UnknownPackage { name: String },
    #[error("Package '{by}' requires '{name}', which is not registered")]
    MissingRequiredPackage { name: String, by: String },

    // numbering
    #[error("Multiple {name}")]
    MultipleCommand { name: String },
    #[error("Label '{label}' multiply defined")]
    MultipleLabel { label: String },
    #[error("{name} not allowed in {env} environment")]
    CommandNotAllowedInEnv { name: String, env: String },
    #[error("Tag form '{name}' is already defined")]
    DuplicateTagForm { name: String },
    #[error("Unknown tag form '{name}'")]
    UnknownTagForm { name: String },
    #[error("{operation} is not supported by the '{policy}' numbering policy")]
    IncompatibleTagPolicy { operation: String, policy: String },

    // protocol
    #[error("Too many retries ({limit}) while waiting for resources")]
    TooManyRetries { limit: usize },
    #[error("Retry misuse: {reason}")]
    RetryMisuse { reason: String },
    #[error("{count} group(s) left open at end of input")]
    UnclosedGroups { count: usize },
    #[error("Sandbox boundary violated: {reason}")]
    SandboxViolation { reason: String },
    #[error("Unbalanced group close: no open group to close")]
    UnbalancedNamespaceDestruction,

    // harness helpers
    #[error("Expected parsing to fail for '{expression}'")]
    ExpectedParseFailure { expression: String },
    #[error("Expected error '{expected}' but got '{found}'")]
    ExpectedErrorId { expected: String, found: String },
    #[error("Enum parse error: {0}")]
    EnumParse(strum::ParseError),
}

impl ParseErrorKind {
    /// Message template identifier; the variant name.
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.into()
    }

    /// Positional substitution values, in declaration order of the fields.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::MissingCloseBracket { name }
            | Self::MissingArgFor { name }
            | Self::MissingDimOrUnits { name }
            | Self::BracketMustBeDimension { name }
            | Self::MissingBeginExtraEnd { name }
            | Self::EnvMissingEnd { name }
            | Self::ExtraEndMissingBegin { name }
            | Self::MissingBoxFor { name }
            | Self::UndefinedControlSequence { name }
            | Self::UnknownEnv { name }
            | Self::InvalidEnv { name }
            | Self::MissingOrUnrecognizedDelim { name }
            | Self::IllegalControlSequenceName { name }
            | Self::IllegalParamNumber { name }
            | Self::SequentialParam { name }
            | Self::MismatchUseDef { name }
            | Self::RunawayArgument { name }
            | Self::NewcommandRedefinition { name }
            | Self::RenewcommandNonexistent { name }
            | Self::ProtectedRedefinition { name }
            | Self::Misplaced { name }
            | Self::AmbiguousUseOf { name }
            | Self::UnknownPackage { name }
            | Self::MultipleCommand { name }
            | Self::DuplicateTagForm { name }
            | Self::UnknownTagForm { name } => vec![name.clone()],
            Self::ExtraCloseLooking { token } | Self::InvalidTokenAfterMacroPrefix { token } => {
                vec![token.clone()]
            }
            Self::TokenNotFoundForCommand { token, name } => vec![token.clone(), name.clone()],
            Self::EnvBadEnd { begin, end } => vec![begin.clone(), end.clone()],
            Self::ExpectedToken { expected, found }
            | Self::ExpectedErrorId { expected, found } => vec![expected.clone(), found.clone()],
            Self::UndefinedColorModel { model } => vec![model.clone()],
            Self::InvalidColorValue { model, value } => vec![model.clone(), value.clone()],
            Self::UnknownItemKind { kind } => vec![kind.clone()],
            Self::MissingRequiredPackage { name, by } => vec![name.clone(), by.clone()],
            Self::MultipleLabel { label } => vec![label.clone()],
            Self::CommandNotAllowedInEnv { name, env } => vec![name.clone(), env.clone()],
            Self::IncompatibleTagPolicy { operation, policy } => {
                vec![operation.clone(), policy.clone()]
            }
            Self::TooManyRetries { limit } => vec![limit.to_string()],
            Self::UnclosedGroups { count } => vec![count.to_string()],
            Self::RetryMisuse { reason } | Self::SandboxViolation { reason } => {
                vec![reason.clone()]
            }
            Self::ExpectedParseFailure { expression } => vec![expression.clone()],
            Self::EnumParse(err) => vec![err.to_string()],
            Self::ExtraCloseMissingOpen
            | Self::ExtraOpenMissingClose
            | Self::MissingCloseBrace
            | Self::MissingLeftExtraRight
            | Self::ExtraLeftMissingRight
            | Self::ExtraMiddle
            | Self::MissingScript
            | Self::MissingOpenForSup
            | Self::MissingOpenForSub
            | Self::DoubleExponent
            | Self::DoubleSubscripts
            | Self::MissingEndgroup
            | Self::MaxMacroSub
            | Self::MaxBufferSize
            | Self::MaxNesting
            | Self::ErroneousNestingEq
            | Self::UnbalancedNamespaceDestruction => Vec::new(),
        }
    }

    /// Which branch of the error taxonomy this kind belongs to.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ExtraCloseMissingOpen
            | Self::ExtraOpenMissingClose
            | Self::MissingCloseBrace
            | Self::MissingCloseBracket { .. }
            | Self::ExtraCloseLooking { .. }
            | Self::MissingArgFor { .. }
            | Self::MissingDimOrUnits { .. }
            | Self::BracketMustBeDimension { .. }
            | Self::TokenNotFoundForCommand { .. }
            | Self::MissingBeginExtraEnd { .. }
            | Self::EnvMissingEnd { .. }
            | Self::EnvBadEnd { .. }
            | Self::MissingLeftExtraRight
            | Self::ExtraLeftMissingRight
            | Self::ExtraMiddle
            | Self::MissingScript
            | Self::MissingOpenForSup
            | Self::MissingOpenForSub
            | Self::DoubleExponent
            | Self::DoubleSubscripts
            | Self::ExtraEndMissingBegin { .. }
            | Self::MissingEndgroup
            | Self::MissingBoxFor { .. }
            | Self::ExpectedToken { .. } => ErrorCategory::Structural,
            Self::MultipleCommand { .. }
            | Self::MultipleLabel { .. }
            | Self::CommandNotAllowedInEnv { .. }
            | Self::DuplicateTagForm { .. }
            | Self::UnknownTagForm { .. }
            | Self::IncompatibleTagPolicy { .. } => ErrorCategory::Numbering,
            Self::TooManyRetries { .. }
            | Self::RetryMisuse { .. }
            | Self::UnclosedGroups { .. }
            | Self::SandboxViolation { .. }
            | Self::UnbalancedNamespaceDestruction => ErrorCategory::Protocol,
            _ => ErrorCategory::Semantic,
        }
    }
}

#[derive(Debug)]
enum ParseErrorContext {
    None,
    Location(SourceLocation),
}

impl fmt::Display for ParseErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Location(SourceLocation { input, start, end }) => {
                let input_len = input.len();
                let start = (*start).min(input_len);
                let end = (*end).clamp(start, input_len);
                if start == input_len {
                    write!(f, " at end of input: ")?;
                } else {
                    write!(f, " at position {}: ", start + 1)?;
                }

                let prefix_start = adjust_char_boundary(input, start.saturating_sub(15), false);
                if prefix_start > 0 {
                    write!(f, "\u{2026}")?;
                }
                write!(f, "{}", &input[prefix_start..start])?;
                for c in input[start..end].chars() {
                    write!(f, "{c}\u{0332}")?;
                }
                let suffix_end = adjust_char_boundary(input, (end + 15).min(input_len), true);
                write!(f, "{}", &input[end..suffix_end])?;
                if suffix_end < input_len {
                    write!(f, "\u{2026}")?;
                }
                Ok(())
            }
        }
    }
}

const fn adjust_char_boundary(input: &str, mut index: usize, forward: bool) -> usize {
    if forward {
        while index < input.len() && !input.is_char_boundary(index) {
            index += 1;
        }
    } else {
        while index > 0 && !input.is_char_boundary(index) {
            index -= 1;
        }
    }
    index
}

/// Trait for types that can provide error location information for
/// [`ParseError`].
pub trait ErrorLocationProvider {
    /// Get the source location if available
    fn loc(&self) -> Option<&SourceLocation>;
}
