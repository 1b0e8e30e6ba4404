#![allow(dead_code)]

use std::{
    panic::{UnwindSafe, catch_unwind},
    sync::OnceLock,
};

use texmml::{
    Engine, MmlNode, ParseEnv, ParseError, ParseErrorKind, Registry, Settings, packages,
};

static DEFAULT_REGISTRY: OnceLock<Registry> = OnceLock::new();
pub fn default_registry() -> &'static Registry {
    DEFAULT_REGISTRY.get_or_init(|| packages::default_registry().unwrap())
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A fresh engine over the default packages.
pub fn engine(settings: Settings) -> Engine {
    init_logger();
    Engine::new(default_registry().clone(), settings).unwrap()
}

pub struct TestExpr {
    pub expr: String,
    pub env: ParseEnv,
    pub file: &'static str,
    pub line: u32,
    pub code: &'static str,
}

/// Set all provenance to None for easier comparison
pub fn strip_provenance(node: &mut MmlNode) {
    node.walk_mut(&mut |node| node.provenance = None);
}

impl TestExpr {
    pub fn in_display(mut self) -> Self {
        self.env = ParseEnv::display();
        self
    }

    fn parse(&self, settings: &Settings) -> Result<MmlNode, ParseError> {
        engine(settings.clone()).drive(&self.expr, self.env, |_| Ok(None))
    }

    pub fn to_parse(self, settings: &Settings) -> Result<(), ParseError> {
        self.parse(settings).map(|_| ())
    }

    pub fn not_to_parse(self, settings: &Settings) -> Result<(), ParseError> {
        match self.parse(settings) {
            Ok(_) => Err(ParseError::new(ParseErrorKind::ExpectedParseFailure {
                expression: self.expr.clone(),
            })),
            Err(_) => Ok(()),
        }
    }

    pub fn to_fail_with(self, id: &str, settings: &Settings) -> Result<(), ParseError> {
        match self.parse(settings) {
            Ok(_) => Err(ParseError::new(ParseErrorKind::ExpectedParseFailure {
                expression: self.expr.clone(),
            })),
            Err(err) if err.id() == id => Ok(()),
            Err(err) => Err(ParseError::new(ParseErrorKind::ExpectedErrorId {
                expected: id.to_owned(),
                found: err.id().to_owned(),
            })),
        }
    }

    pub fn to_parse_like(self, other: &str, settings: &Settings) -> Result<(), ParseError> {
        // Compare trees, ignoring where they came from
        let mut tree1 = self.parse(settings)?;
        let mut tree2 = engine(settings.clone()).drive(other, self.env, |_| Ok(None))?;

        strip_provenance(&mut tree1);
        strip_provenance(&mut tree2);

        assert_eq!(
            tree1, tree2,
            "Trees do not match between '{}' and '{}' ({}:{}: {})",
            self.expr, other, self.file, self.line, self.code
        );
        Ok(())
    }
}

pub fn expect_impl(expr: &str, file: &'static str, line: u32, code: &'static str) -> TestExpr {
    TestExpr {
        expr: expr.to_owned(),
        env: ParseEnv::inline(),
        file,
        line,
        code,
    }
}

#[macro_export]
macro_rules! expect {
    ($e:expr) => {
        $crate::setup::expect_impl($e, file!(), line!(), stringify!($e))
    };
}

pub fn it<F>(desc: &str, test_fn: F)
where
    F: FnOnce() -> Result<(), ParseError> + UnwindSafe,
{
    match catch_unwind(test_fn) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            panic!("Test '{desc}' failed with Result::Err: {e}");
        }
        Err(panic_payload) => {
            let msg = if let Some(s) = panic_payload.downcast_ref::<&str>() {
                (*s).to_owned()
            } else if let Some(s) = panic_payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "<non-string panic payload>".to_owned()
            };
            panic!("Test '{desc}' panicked: {msg}");
        }
    }
}

/// Settings helpers
pub fn default_settings() -> Settings {
    Settings::default()
}

/// Numbering on, for tests that parse displayed equations
pub fn display_settings() -> Settings {
    ams_settings()
}

pub fn ams_settings() -> Settings {
    Settings::builder().tags("ams".to_owned()).build()
}

pub fn all_settings() -> Settings {
    Settings::builder().tags("all".to_owned()).build()
}

pub fn sandbox_settings() -> Settings {
    Settings::builder().sandbox(true).build()
}

pub fn global_group_settings() -> Settings {
    Settings::builder().global_group(true).build()
}

/// The `math` root of `expr`, parsed inline.
pub fn get_parsed(expr: &str, settings: &Settings) -> Result<MmlNode, ParseError> {
    engine(settings.clone()).drive(expr, ParseEnv::inline(), |_| Ok(None))
}

/// The `math` root of `expr`, parsed as display math.
pub fn get_parsed_display(expr: &str, settings: &Settings) -> Result<MmlNode, ParseError> {
    engine(settings.clone()).drive(expr, ParseEnv::display(), |_| Ok(None))
}

/// The only child of the `math` root of `expr`.
pub fn get_single(expr: &str) -> Result<MmlNode, ParseError> {
    let mut root = get_parsed(expr, &default_settings())?;
    assert_eq!(
        root.children.len(),
        1,
        "expected one node from '{expr}', got {root}"
    );
    Ok(root.children.remove(0))
}

/// Every node of `root`, depth first.
pub fn collect(root: &MmlNode) -> Vec<&MmlNode> {
    let mut out = vec![root];
    for child in &root.children {
        out.extend(collect(child));
    }
    out
}

#[macro_export]
macro_rules! assert_let {
    ($pat:pat = $expr:expr, $($arg:tt)+) => {
        let $pat = $expr else {
            panic!($($arg)+);
        };
    };
    ($pat:pat = $expr:expr) => {
        let $pat = $expr else {
            panic!(
                "assert_let failed: pattern `{}` did not match {} at {}:{} \n{:#?}",
                stringify!($pat), stringify!($expr),
                file!(), line!(),
                $expr
            );
        };
    };
}
