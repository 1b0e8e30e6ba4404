//! TeX math markup to a MathML-shaped tree.
//!
//! The parser is table driven: every character, control sequence,
//! environment and delimiter it understands comes from a [`Package`]
//! registered with a [`Registry`]. Parsing runs on a stack of
//! [`StackItem`](stack::StackItem)s that reduce into [`MmlNode`]s, user
//! definitions follow TeX grouping through a [`Namespace`], and equation
//! numbering is handled by a [`TagManager`] with a pluggable policy.
//!
//! ```
//! use texmml::{Engine, NodeKind, ParseEnv, Settings};
//!
//! let mut engine = Engine::with_defaults(Settings::default())?;
//! let root = engine.drive("x^2", ParseEnv::inline(), |_| Ok(None))?;
//! assert_eq!(root.children[0].kind, NodeKind::Msup);
//! # Ok::<(), texmml::ParseError>(())
//! ```
#![warn(missing_docs)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![warn(clippy::str_to_string)]
#![warn(clippy::non_ascii_literal)]
#![warn(clippy::pointer_format)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::panic)]
#![warn(clippy::expect_used)]
#![warn(clippy::unwrap_in_result)]
#![warn(clippy::if_then_some_else_none)]
#![warn(clippy::get_unwrap)]
#![warn(clippy::impl_trait_in_params)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::unimplemented)]
#![warn(clippy::return_and_then)]
#![warn(clippy::needless_raw_strings)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(clippy::rc_buffer)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::separated_literal_suffix)]
#![warn(clippy::ref_patterns)]
// Not sure
#![allow(clippy::indexing_slicing)]
#![allow(clippy::string_slice)]
#![allow(clippy::pub_use)]
// clippy exceptions
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::single_call_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

extern crate alloc;

pub mod engine;
pub mod lexer;
pub mod namespace;
pub mod node;
pub mod packages;
pub mod parser;
pub mod registry;
pub mod retry;
pub mod stack;
pub mod tags;
pub mod types;

pub use engine::Engine;
pub use namespace::{KeyMap, KeySet, Namespace};
pub use node::{MmlNode, NodeKind};
pub use parser::{ParseEnv, TexParser};
pub use registry::{Configuration, Package, Registry};
pub use retry::{Halt, ParseOutcome, ParseResult, Pending, Resolution};
pub use tags::{TagManager, TagPolicy};
pub use types::{ErrorCategory, ParseError, ParseErrorKind, Settings, TexClass, Variant};

/// Parses `input` with the default packages and settings, loading any
/// built-in package the input asks for.
pub fn parse(input: &str, display: bool) -> Result<MmlNode, ParseError> {
    let env = if display {
        ParseEnv::display()
    } else {
        ParseEnv::inline()
    };
    Engine::with_defaults(Settings::default())?.drive(input, env, |_| Ok(None))
}
