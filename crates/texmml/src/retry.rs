//! Suspension and replay of a parse attempt.
//!
//! A handler that needs something the engine does not have yet (usually a
//! package that is loaded lazily) stops the attempt with [`Halt::Suspend`].
//! The attempt is thrown away as a whole: its stack, its open groups and its
//! tag state never outlive the call that created them. The host receives a
//! [`Pending`] describing what is missing and replays the original input with
//! [`Engine::resume`](crate::Engine::resume) once it has been provided.

use core::fmt;

use crate::node::MmlNode;
use crate::parser::ParseEnv;
use crate::types::ParseError;

/// What a suspended attempt is waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// A package, by registration name.
    Package(String),
    /// Some host-defined resource, identified by name. The engine never
    /// resolves these itself.
    Resource(String),
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package(name) => write!(f, "package '{name}'"),
            Self::Resource(name) => write!(f, "resource '{name}'"),
        }
    }
}

/// Why a parse stopped early. Every parsing primitive and handler returns
/// `Result<T, Halt>`, so `?` carries both kinds to the top level.
#[derive(Debug)]
pub enum Halt {
    /// A classified error. Ends the attempt for good.
    Error(ParseError),
    /// A request to abandon this attempt and replay it after `Resolution`
    /// has been provided.
    Suspend(Resolution),
}

impl From<ParseError> for Halt {
    fn from(err: ParseError) -> Self {
        Self::Error(err)
    }
}

/// Result type used throughout the parser and the handlers.
pub type ParseResult<T> = Result<T, Halt>;

/// A suspended parse: everything needed to replay it.
#[derive(Debug, Clone)]
pub struct Pending {
    /// The original input, before pre-filters ran.
    pub input: String,
    /// The original environment.
    pub env: ParseEnv,
    /// What the attempt is waiting for.
    pub resolution: Resolution,
    /// How many attempts have been made so far, starting at 1.
    pub attempt: usize,
}

/// Result of a top-level parse attempt.
#[derive(Debug)]
#[must_use]
pub enum ParseOutcome {
    /// The finished tree.
    Done(MmlNode),
    /// The attempt was abandoned and can be replayed.
    Suspend(Pending),
    /// The attempt failed with a classified error.
    Failed(ParseError),
}

impl ParseOutcome {
    /// Whether a tree was produced.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// The tree, if the attempt finished.
    #[must_use]
    pub fn done(self) -> Option<MmlNode> {
        match self {
            Self::Done(node) => Some(node),
            _ => None,
        }
    }

    /// The error, if the attempt failed.
    #[must_use]
    pub fn failed(self) -> Option<ParseError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// The pending replay, if the attempt suspended.
    #[must_use]
    pub fn pending(self) -> Option<Pending> {
        match self {
            Self::Suspend(pending) => Some(pending),
            _ => None,
        }
    }
}
