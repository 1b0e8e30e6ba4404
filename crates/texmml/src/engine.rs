//! The top-level entry point.
//!
//! An [`Engine`] owns the registry, the settings and the document-wide state
//! that outlives single formulas: global user definitions, colors made with
//! `\definecolor` and the equation numbering tables. Each call to
//! [`Engine::parse`] runs one attempt over a private copy of that state and
//! commits it back only when the attempt produces a tree.
//!
//! An attempt that needs a package the engine does not have comes back as
//! [`ParseOutcome::Suspend`]. The host provides the package (or lets
//! [`Engine::resolve`] fetch a built-in one) and replays the input with
//! [`Engine::resume`]; [`Engine::drive`] runs that loop.

use alloc::sync::Arc;

use log::{debug, info};

use crate::lexer;
use crate::namespace::{KeyMap, Mapping, Namespace};
use crate::node::{MmlNode, NodeKind};
use crate::packages::{self, base};
use crate::parser::{Definition, MacroDef, ParseEnv, ParseState, TexParser};
use crate::registry::{Configuration, Package, Registry};
use crate::retry::{Halt, ParseOutcome, Pending, Resolution};
use crate::tags::TagManager;
use crate::types::{ParseError, ParseErrorKind, Settings};

/// A parser bound to a registry, with document-wide state.
#[derive(Debug)]
pub struct Engine {
    registry: Registry,
    settings: Settings,
    config: Option<Arc<Configuration>>,
    macros: Mapping<Definition>,
    colors: KeyMap<String, String>,
    tags: TagManager,
    retries: usize,
}

impl Engine {
    /// An engine over `registry`. Fails when `settings.tags` names a policy
    /// no registered package provides.
    pub fn new(registry: Registry, settings: Settings) -> Result<Self, ParseError> {
        let config = registry.configuration();
        let tags = TagManager::new(config.tag_policy(&settings.tags)?, &settings);
        let macros = settings
            .macros
            .iter()
            .map(|(name, body)| {
                let def = MacroDef::new(body, lexer::parameter_count(body));
                (name.clone(), Definition::Macro(def))
            })
            .collect();
        Ok(Self {
            registry,
            settings,
            config: Some(Arc::new(config)),
            macros,
            colors: KeyMap::default(),
            tags,
            retries: 0,
        })
    }

    /// An engine over [`packages::default_registry`].
    pub fn with_defaults(settings: Settings) -> Result<Self, ParseError> {
        Self::new(packages::default_registry()?, settings)
    }

    /// The engine settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The registered packages.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Equation numbering state: labels, ids and counters committed so far.
    #[must_use]
    pub const fn tags(&self) -> &TagManager {
        &self.tags
    }

    /// Restarts equation numbering at `offset`.
    pub fn reset_tags(&mut self, offset: usize, keep_labels: bool) {
        self.tags.reset(offset, keep_labels);
    }

    /// Replays of the current expression so far.
    #[must_use]
    pub const fn retry_count(&self) -> usize {
        self.retries
    }

    /// The committed definition of the control sequence `name`.
    #[must_use]
    pub fn macro_definition(&self, name: &str) -> Option<&Definition> {
        self.macros.get(name)
    }

    /// Registers `package` for the following parses.
    pub fn register(&mut self, package: Package) -> Result<(), ParseError> {
        self.registry.register(package)?;
        self.config = None;
        Ok(())
    }

    /// Provides what a suspended attempt asked for, from the built-in
    /// packages. Host-defined resources cannot be provided this way.
    pub fn resolve(&mut self, resolution: &Resolution) -> Result<(), ParseError> {
        match resolution {
            Resolution::Package(name) => self.load(name),
            Resolution::Resource(_) => Err(ParseError::new(ParseErrorKind::RetryMisuse {
                reason: format!("the engine cannot provide {resolution}"),
            })),
        }
    }

    fn load(&mut self, name: &str) -> Result<(), ParseError> {
        if self.registry.has(name) {
            return Ok(());
        }
        let package = packages::catalog(name).ok_or_else(|| {
            ParseError::new(ParseErrorKind::UnknownPackage {
                name: name.to_owned(),
            })
        })?;
        for required in &package.requires {
            self.load(required)?;
        }
        info!("loading package '{name}'");
        self.register(package)
    }

    /// Parses `input` in `env`.
    pub fn parse(&mut self, input: &str, env: ParseEnv) -> ParseOutcome {
        self.retries = 0;
        self.attempt(input, env)
    }

    /// Replays a suspended parse.
    pub fn resume(&mut self, pending: Pending) -> ParseOutcome {
        self.retries += 1;
        if let Some(limit) = self.settings.max_retries
            && self.retries > limit
        {
            return ParseOutcome::Failed(ParseError::new(ParseErrorKind::TooManyRetries {
                limit,
            }));
        }
        debug!("replaying attempt {} after {}", pending.attempt, pending.resolution);
        self.attempt(&pending.input, pending.env)
    }

    /// Parses `input`, satisfying suspensions with `resolver` until the parse
    /// finishes. A resolver answering `None` defers to [`Engine::resolve`].
    pub fn drive<F>(&mut self, input: &str, env: ParseEnv, mut resolver: F) -> Result<MmlNode, ParseError>
    where
        F: FnMut(&Resolution) -> Result<Option<Package>, ParseError>,
    {
        let mut outcome = self.parse(input, env);
        loop {
            let pending = match outcome {
                ParseOutcome::Done(node) => return Ok(node),
                ParseOutcome::Failed(err) => return Err(err),
                ParseOutcome::Suspend(pending) => pending,
            };
            match resolver(&pending.resolution)? {
                Some(package) => self.register(package)?,
                None => self.resolve(&pending.resolution)?,
            }
            if let Resolution::Package(name) = &pending.resolution
                && !self.registry.has(name)
            {
                return Err(ParseError::new(ParseErrorKind::RetryMisuse {
                    reason: format!("{} was not provided", pending.resolution),
                }));
            }
            outcome = self.resume(pending);
        }
    }

    fn configuration(&mut self) -> Arc<Configuration> {
        let registry = &self.registry;
        let config = self
            .config
            .get_or_insert_with(|| Arc::new(registry.configuration()));
        Arc::clone(config)
    }

    fn attempt(&mut self, input: &str, env: ParseEnv) -> ParseOutcome {
        let config = self.configuration();
        let mut text = input.to_owned();
        for filter in config.pre_filters() {
            filter(&mut text, &env);
        }

        let mut namespace = Namespace::new(self.macros.clone());
        for name in config.protected() {
            namespace.protect(name);
        }
        if self.settings.sandbox {
            namespace.begin_sandbox();
        } else if !self.settings.global_group {
            namespace.begin_group();
        }
        let mut tags = self.tags.clone();
        tags.start_equation();
        let mut state = ParseState::new(namespace, tags, self.colors.clone());

        let result = TexParser::new(&text, env, &mut state, &config, &self.settings).parse();
        match result {
            Ok(node) => {
                let mut root = math(node, &text, env);
                for filter in config.post_filters() {
                    filter(&mut root, &env);
                }
                let (namespace, mut tags, colors) = state.into_parts();
                self.macros = namespace.into_globals();
                tags.finish_equation();
                self.tags = tags;
                self.colors = colors;
                ParseOutcome::Done(root)
            }
            Err(Halt::Suspend(resolution)) => {
                if let Resolution::Package(name) = &resolution
                    && self.registry.has(name)
                {
                    return ParseOutcome::Failed(ParseError::new(ParseErrorKind::RetryMisuse {
                        reason: format!("{resolution} is already registered"),
                    }));
                }
                info!("parse suspended on {resolution}");
                ParseOutcome::Suspend(Pending {
                    input: input.to_owned(),
                    env,
                    resolution,
                    attempt: self.retries + 1,
                })
            }
            Err(Halt::Error(err)) => {
                debug!("parse failed: {err}");
                ParseOutcome::Failed(err)
            }
        }
    }
}

/// Wraps a finished parse in the `math` element.
fn math(node: MmlNode, source: &str, env: ParseEnv) -> MmlNode {
    let mut root = MmlNode::with_children(NodeKind::Math, base::contents(node));
    if env.display {
        root.set_attr("display", "block");
    }
    root.provenance = Some(source.to_owned());
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        Engine::with_defaults(Settings::default()).unwrap()
    }

    #[test]
    fn test_math_wrapper() {
        let mut engine = engine();
        let root = engine.parse("x+1", ParseEnv::display()).done().unwrap();
        assert_eq!(root.kind, NodeKind::Math);
        assert_eq!(root.get_attr("display"), Some("block"));
        assert_eq!(root.children.len(), 3);

        let root = engine.parse("x", ParseEnv::inline()).done().unwrap();
        assert_eq!(root.get_attr("display"), None);
    }

    #[test]
    fn test_unknown_tag_form() {
        let settings = Settings::builder().tags("chapter".to_owned()).build();
        let err = Engine::with_defaults(settings).unwrap_err();
        assert_eq!(err.id(), "UnknownTagForm");
    }

    #[test]
    fn test_preset_macros() {
        let mut macros = KeyMap::default();
        macros.insert("half".to_owned(), "\\frac{#1}{2}".to_owned());
        let settings = Settings::builder().macros(macros).build();
        let mut engine = Engine::with_defaults(settings).unwrap();
        let Some(Definition::Macro(def)) = engine.macro_definition("half") else {
            panic!("preset macro missing");
        };
        assert_eq!(def.params, 1);
        let root = engine.parse("\\half{x}", ParseEnv::inline()).done().unwrap();
        assert_eq!(root.children[0].kind, NodeKind::Mfrac);
    }

    #[test]
    fn test_resolve() {
        let mut engine = engine();
        engine
            .resolve(&Resolution::Package("color".to_owned()))
            .unwrap();
        assert!(engine.registry().has("color"));
        let err = engine
            .resolve(&Resolution::Package("physics".to_owned()))
            .unwrap_err();
        assert_eq!(err.id(), "UnknownPackage");
        let err = engine
            .resolve(&Resolution::Resource("font".to_owned()))
            .unwrap_err();
        assert_eq!(err.id(), "RetryMisuse");
    }

    #[test]
    fn test_retry_limit() {
        let settings = Settings::builder().max_retries(1).build();
        let mut engine = Engine::with_defaults(settings).unwrap();
        let pending = engine
            .parse("\\require{color}x", ParseEnv::inline())
            .pending()
            .unwrap();
        assert_eq!(pending.attempt, 1);
        let pending = engine.resume(pending).pending().unwrap();
        assert_eq!(pending.attempt, 2);
        let err = engine.resume(pending).failed().unwrap();
        assert_eq!(err.id(), "TooManyRetries");
    }
}
