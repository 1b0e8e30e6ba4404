//! Handler registry and the merged per-parse configuration.
//!
//! Packages are the only extension point of the engine. A [`Package`] lists
//! the handler maps it contributes for each [`HandlerType`], extra stack item
//! kinds, filters, numbering policies and lazily loadable commands. The
//! [`Registry`] keeps the registered packages and merges them, in priority
//! order, into a [`Configuration`] that one top-level parse reads from.

mod handlers;

pub use handlers::{
    Binding, CharacterHandler, CharacterSpec, DelimiterSpec, EnvironmentHandler,
    EnvironmentSpec, HandlerMap, MacroHandler, MacroSpec,
};

use alloc::sync::Arc;

use log::{debug, warn};

use crate::namespace::{KeyMap, KeySet};
use crate::node::MmlNode;
use crate::parser::ParseEnv;
use crate::stack::StackItem;
use crate::tags::TagPolicy;
use crate::types::{HandlerType, ParseError, ParseErrorKind};

/// Rewrites the input before scanning starts.
pub type PreFilter = fn(input: &mut String, env: &ParseEnv);
/// Rewrites the finished tree of a top-level parse.
pub type PostFilter = fn(root: &mut MmlNode, env: &ParseEnv);
/// Builds a fresh stack item of a package-defined kind.
pub type ItemConstructor = fn() -> StackItem;
/// Builds a numbering policy.
pub type TagPolicyConstructor = fn() -> Box<dyn TagPolicy>;

/// Everything a macro package contributes.
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// Registration name, also used by `\require` and autoloading.
    pub name: String,
    /// Shadowing priority: bindings of a higher priority package win.
    pub priority: i32,
    /// Character maps.
    pub characters: Vec<HandlerMap<CharacterSpec>>,
    /// Control sequence maps.
    pub macros: Vec<HandlerMap<MacroSpec>>,
    /// Environment maps.
    pub environments: Vec<HandlerMap<EnvironmentSpec>>,
    /// Delimiter maps.
    pub delimiters: Vec<HandlerMap<DelimiterSpec>>,
    /// Stack item kinds, by name.
    pub items: Vec<(String, ItemConstructor)>,
    /// Input filters with their ordering priority (lower runs first).
    pub pre_filters: Vec<(PreFilter, i32)>,
    /// Tree filters with their ordering priority (lower runs first).
    pub post_filters: Vec<(PostFilter, i32)>,
    /// Numbering policies, by name.
    pub tag_policies: Vec<(String, TagPolicyConstructor)>,
    /// Control sequence name to the package that defines it.
    pub autoload: Vec<(String, String)>,
    /// Control sequences user definitions may not replace.
    pub protected: Vec<String>,
    /// Packages that must be registered first.
    pub requires: Vec<String>,
}

impl Package {
    /// An empty package.
    #[must_use]
    pub fn new(name: &str, priority: i32) -> Self {
        Self {
            name: name.to_owned(),
            priority,
            ..Self::default()
        }
    }
}

/// Registered packages, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    packages: Vec<Package>,
}

impl Registry {
    /// A registry with nothing in it.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            packages: Vec::new(),
        }
    }

    /// Adds `package`. A package of the same name is replaced in place.
    pub fn register(&mut self, package: Package) -> Result<(), ParseError> {
        for required in &package.requires {
            if !self.has(required) {
                return Err(ParseError::new(ParseErrorKind::MissingRequiredPackage {
                    name: required.clone(),
                    by: package.name.clone(),
                }));
            }
        }
        for (form, _) in &package.tag_policies {
            let taken = self
                .packages
                .iter()
                .filter(|p| p.name != package.name)
                .any(|p| p.tag_policies.iter().any(|(name, _)| name == form));
            if taken {
                return Err(ParseError::new(ParseErrorKind::DuplicateTagForm {
                    name: form.clone(),
                }));
            }
        }
        if let Some(slot) = self.packages.iter_mut().find(|p| p.name == package.name) {
            warn!("package '{}' registered twice; replacing it", package.name);
            *slot = package;
        } else {
            debug!(
                "registering package '{}' at priority {}",
                package.name, package.priority
            );
            self.packages.push(package);
        }
        Ok(())
    }

    /// Whether a package named `name` is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.packages.iter().any(|p| p.name == name)
    }

    /// Names of the registered packages, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(|p| p.name.as_str())
    }

    /// Merges every registered package into a configuration.
    ///
    /// Packages are applied from the lowest priority to the highest, with
    /// registration order breaking ties, so that for each handler type the
    /// binding from the last applied package wins.
    #[must_use]
    pub fn configuration(&self) -> Configuration {
        let mut order: Vec<&Package> = self.packages.iter().collect();
        order.sort_by_key(|p| p.priority);

        let mut config = Configuration::default();
        let mut pre = Vec::new();
        let mut post = Vec::new();
        for package in order {
            for map in &package.characters {
                merge(&mut config.characters, map, HandlerType::Character, &package.name);
                // later maps are consulted first, each in its own order
                config
                    .character_classes
                    .splice(0..0, map.classes().iter().copied());
            }
            for map in &package.macros {
                merge(&mut config.macros, map, HandlerType::Macro, &package.name);
            }
            for map in &package.environments {
                merge(
                    &mut config.environments,
                    map,
                    HandlerType::Environment,
                    &package.name,
                );
            }
            for map in &package.delimiters {
                merge(&mut config.delimiters, map, HandlerType::Delimiter, &package.name);
            }
            for (name, constructor) in &package.items {
                config.items.insert(name.clone(), *constructor);
            }
            for (name, constructor) in &package.tag_policies {
                config.tag_policies.insert(name.clone(), *constructor);
            }
            for (cs, owner) in &package.autoload {
                config.autoload.insert(cs.clone(), owner.clone());
            }
            pre.extend(package.pre_filters.iter().copied());
            post.extend(package.post_filters.iter().copied());
            config.protected.extend(package.protected.iter().cloned());
            config.packages.insert(package.name.clone());
        }
        // stable sort keeps registration order among equal priorities
        pre.sort_by_key(|(_, priority)| *priority);
        post.sort_by_key(|(_, priority)| *priority);
        config.pre_filters = pre.into_iter().map(|(f, _)| f).collect();
        config.post_filters = post.into_iter().map(|(f, _)| f).collect();
        config
    }
}

fn merge<T: Copy>(
    target: &mut KeyMap<String, T>,
    map: &HandlerMap<T>,
    handler_type: HandlerType,
    package: &str,
) {
    for (key, spec) in map.entries() {
        if target.insert(key.clone(), *spec).is_some() {
            debug!(
                "{handler_type} binding '{key}' shadowed by map '{}' of package '{package}'",
                map.name()
            );
        }
    }
}

/// The merged, read-only handler set one top-level parse works with.
#[derive(Debug, Default)]
pub struct Configuration {
    characters: KeyMap<String, CharacterSpec>,
    /// Highest priority first.
    character_classes: Vec<(fn(char) -> bool, CharacterSpec)>,
    macros: KeyMap<String, MacroSpec>,
    environments: KeyMap<String, EnvironmentSpec>,
    delimiters: KeyMap<String, DelimiterSpec>,
    items: KeyMap<String, ItemConstructor>,
    pre_filters: Vec<PreFilter>,
    post_filters: Vec<PostFilter>,
    tag_policies: KeyMap<String, TagPolicyConstructor>,
    autoload: KeyMap<String, String>,
    protected: Vec<String>,
    packages: KeySet<String>,
}

impl Configuration {
    /// Finds the binding for `token` among the maps of `handler_type`.
    ///
    /// For characters, exact bindings are consulted before class bindings.
    #[must_use]
    pub fn lookup(&self, handler_type: HandlerType, token: &str) -> Option<Binding<'_>> {
        match handler_type {
            HandlerType::Character => {
                let mut chars = token.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                self.character(c).map(Binding::Character)
            }
            HandlerType::Macro => self.macros.get(token).map(Binding::Macro),
            HandlerType::Environment => self.environments.get(token).map(Binding::Environment),
            HandlerType::Delimiter => self.delimiters.get(token).map(Binding::Delimiter),
        }
    }

    /// Handler for an input character.
    #[must_use]
    pub fn character(&self, c: char) -> Option<&CharacterSpec> {
        let mut buf = [0; 4];
        self.characters.get(&*c.encode_utf8(&mut buf)).or_else(|| {
            self.character_classes
                .iter()
                .find(|(predicate, _)| predicate(c))
                .map(|(_, spec)| spec)
        })
    }

    /// Handler for a control sequence name (without backslash).
    #[must_use]
    pub fn macro_spec(&self, name: &str) -> Option<&MacroSpec> {
        self.macros.get(name)
    }

    /// Handler for an environment.
    #[must_use]
    pub fn environment(&self, name: &str) -> Option<&EnvironmentSpec> {
        self.environments.get(name)
    }

    /// Delimiter data for a delimiter token (`(`, `\langle`, ...).
    #[must_use]
    pub fn delimiter(&self, name: &str) -> Option<&DelimiterSpec> {
        self.delimiters.get(name)
    }

    /// Builds an item of a package-defined kind.
    pub fn create_item(&self, kind: &str) -> Result<StackItem, ParseError> {
        self.items.get(kind).map(|create| create()).ok_or_else(|| {
            ParseError::new(ParseErrorKind::UnknownItemKind {
                kind: kind.to_owned(),
            })
        })
    }

    /// Input filters in the order they run.
    #[must_use]
    pub fn pre_filters(&self) -> &[PreFilter] {
        &self.pre_filters
    }

    /// Tree filters in the order they run.
    #[must_use]
    pub fn post_filters(&self) -> &[PostFilter] {
        &self.post_filters
    }

    /// Instantiates the numbering policy called `name`.
    pub fn tag_policy(&self, name: &str) -> Result<Arc<dyn TagPolicy>, ParseError> {
        self.tag_policies
            .get(name)
            .map(|create| Arc::from(create()))
            .ok_or_else(|| {
                ParseError::new(ParseErrorKind::UnknownTagForm {
                    name: name.to_owned(),
                })
            })
    }

    /// Package that defines the control sequence `name`, if it is autoloaded.
    #[must_use]
    pub fn autoload(&self, name: &str) -> Option<&str> {
        self.autoload.get(name).map(String::as_str)
    }

    /// Names user definitions may not replace.
    #[must_use]
    pub fn protected(&self) -> &[String] {
        &self.protected
    }

    /// Whether the package `name` took part in this configuration.
    #[must_use]
    pub fn has_package(&self, name: &str) -> bool {
        self.packages.contains(name)
    }
}
