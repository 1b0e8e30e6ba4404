//! `\require{package}` and the autoload table for packages that are not
//! registered up front.
//!
//! Neither loads anything itself: both stop the attempt with a
//! [`Resolution::Package`] and leave it to the host to provide the package
//! and replay.

use log::debug;

use crate::parser::TexParser;
use crate::registry::{HandlerMap, MacroSpec, Package};
use crate::retry::{Halt, ParseResult, Resolution};
use crate::types::ParseErrorKind;

use super::EXTENSION_PRIORITY;
use super::{base, color};

/// Registration name.
pub const NAME: &str = "require";

static COMMANDS: phf::Map<&'static str, MacroSpec> = phf::phf_map! {
    "require" => MacroSpec::new(require),
};

/// Control sequences that load their package on first use.
const AUTOLOAD: &[(&str, &str)] = &[
    ("color", color::NAME),
    ("textcolor", color::NAME),
    ("colorbox", color::NAME),
    ("definecolor", color::NAME),
];

/// Builds the require package.
#[must_use]
pub fn package() -> Package {
    Package {
        macros: vec![HandlerMap::from_table("require", &COMMANDS, |spec| spec)],
        autoload: AUTOLOAD
            .iter()
            .map(|(cs, package)| ((*cs).to_owned(), (*package).to_owned()))
            .collect(),
        requires: vec![base::NAME.to_owned()],
        ..Package::new(NAME, EXTENSION_PRIORITY)
    }
}

fn require(parser: &mut TexParser<'_>, name: &str, _: &MacroSpec) -> ParseResult<()> {
    let arg = parser.get_argument(name, false)?;
    let package = arg.trim();
    if package.is_empty() {
        return Err(parser.error(ParseErrorKind::MissingArgFor {
            name: name.to_owned(),
        }));
    }
    if parser.config.has_package(package) {
        return Ok(());
    }
    debug!("\\require{{{package}}} suspends the parse");
    Err(Halt::Suspend(Resolution::Package(package.to_owned())))
}
