//! The built-in packages.
//!
//! Each package is a plain [`Package`] value; nothing in the engine refers to
//! them by name. [`default_registry`] registers the ones every parse expects,
//! and [`catalog`] hands out any of them, which is how lazily requested
//! packages are found.

pub mod ams;
pub mod base;
pub mod color;
pub mod newcommand;
pub mod require;

use crate::registry::{Package, Registry};
use crate::types::ParseError;

/// Priority of the packages layered over `base`.
pub const EXTENSION_PRIORITY: i32 = 10;

/// The built-in package called `name`.
#[must_use]
pub fn catalog(name: &str) -> Option<Package> {
    match name {
        base::NAME => Some(base::package()),
        ams::NAME => Some(ams::package()),
        newcommand::NAME => Some(newcommand::package()),
        color::NAME => Some(color::package()),
        require::NAME => Some(require::package()),
        _ => None,
    }
}

/// A registry holding `base`, `ams`, `newcommand` and `require`. The `color`
/// package is left out; its commands load it on first use.
pub fn default_registry() -> Result<Registry, ParseError> {
    let mut registry = Registry::empty();
    registry.register(base::package())?;
    registry.register(ams::package())?;
    registry.register(newcommand::package())?;
    registry.register(require::package())?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_match() {
        for name in ["base", "ams", "newcommand", "color", "require"] {
            let package = catalog(name).unwrap();
            assert_eq!(package.name, name);
        }
        assert!(catalog("physics").is_none());
    }

    #[test]
    fn test_default_registry() {
        let registry = default_registry().unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, ["base", "ams", "newcommand", "require"]);
        let config = registry.configuration();
        assert!(config.macro_spec("frac").is_some());
        assert!(config.environment("align").is_some());
        assert_eq!(config.autoload("color"), Some("color"));
    }
}
