mod setup;
use setup::*;
use texmml::{
    ErrorCategory, NodeKind, Package, ParseEnv, ParseResult, Resolution, TagPolicy, TexParser,
    packages::{self, EXTENSION_PRIORITY},
    parser::Definition,
    registry::{HandlerMap, MacroSpec, TagPolicyConstructor},
    tags::TagOperation,
};

// Every function is a group of related behaviors

/// Texts of the tag cells in `root`, in document order.
fn tag_texts(root: &texmml::MmlNode) -> Vec<String> {
    collect(root)
        .into_iter()
        .filter(|node| node.kind == NodeKind::Mtd && node.get_attr("id").is_some())
        .map(|node| node.children[0].text().to_owned())
        .collect()
}

#[test]
fn a_script_parser() {
    it("should combine a subscript and a superscript", || {
        let node = get_single("A_B^C")?;
        assert_eq!(node.kind, NodeKind::Msubsup);
        let texts: Vec<&str> = node.children.iter().map(|child| child.text()).collect();
        assert_eq!(texts, ["A", "B", "C"]);
        Ok(())
    });

    it("should accept scripts in either order", || {
        expect!("A^C_B").to_parse_like("A_B^C", &default_settings())
    });

    it("should build a lone superscript", || {
        assert_eq!(get_single("x^2")?.kind, NodeKind::Msup);
        assert_eq!(get_single("x_i")?.kind, NodeKind::Msub);
        Ok(())
    });

    it("should refuse doubled scripts", || {
        expect!("x^1^2").to_fail_with("DoubleExponent", &default_settings())?;
        expect!("x_1_2").to_fail_with("DoubleSubscripts", &default_settings())
    });

    it("should refuse a dangling script", || {
        expect!("x^").to_fail_with("MissingScript", &default_settings())
    });

    it("should put a prime after a subscript in the superscript slot", || {
        let node = get_single("x_1'")?;
        assert_eq!(node.kind, NodeKind::Msubsup);
        let texts: Vec<&str> = node.children.iter().map(|child| child.text()).collect();
        assert_eq!(texts, ["x", "1", "\u{2032}"]);
        Ok(())
    });
}

/// Texts of the leaf tokens of `root`, in document order.
fn leaf_texts(root: &texmml::MmlNode) -> Vec<String> {
    collect(root)
        .into_iter()
        .filter(|node| node.children.is_empty() && node.text.is_some())
        .map(|node| node.text().to_owned())
        .collect()
}

#[test]
fn a_function_application() {
    it("should apply a function to its argument", || {
        let root = get_parsed("\\sin x", &default_settings())?;
        assert_eq!(leaf_texts(&root), ["sin", "\u{2061}", "x"]);
        Ok(())
    });

    it("should not apply a function to a space", || {
        let root = get_parsed("\\sin\\,x", &default_settings())?;
        assert!(!leaf_texts(&root).iter().any(|text| text == "\u{2061}"));
        Ok(())
    });

    it("should not apply a function to an operator", || {
        let root = get_parsed("\\sin+x", &default_settings())?;
        assert_eq!(leaf_texts(&root), ["sin", "+", "x"]);
        Ok(())
    });

    it("should apply only the last of adjacent functions", || {
        let root = get_parsed("\\sin\\cos x", &default_settings())?;
        assert_eq!(leaf_texts(&root), ["sin", "cos", "\u{2061}", "x"]);
        Ok(())
    });
}

#[test]
fn a_fraction_parser() {
    it("should take the group before over as the numerator", || {
        let root = get_parsed("{a \\over b}", &default_settings())?;
        let frac = collect(&root)
            .into_iter()
            .find(|node| node.kind == NodeKind::Mfrac)
            .unwrap();
        assert_eq!(leaf_texts(frac), ["a", "b"]);
        Ok(())
    });

    it("should keep a styled numerator", || {
        for expr in [
            "{\\displaystyle a \\over b}",
            "\\displaystyle a \\over b",
            "{\\color{red} a \\over b}",
            "\\scriptstyle a \\over b",
        ] {
            let root = get_parsed(expr, &default_settings())?;
            let frac = collect(&root)
                .into_iter()
                .find(|node| node.kind == NodeKind::Mfrac)
                .unwrap();
            assert_eq!(leaf_texts(frac), ["a", "b"], "in {expr}");
            let style = collect(&root)
                .into_iter()
                .find(|node| node.kind == NodeKind::Mstyle)
                .unwrap();
            assert!(collect(style).iter().any(|node| node.kind == NodeKind::Mfrac));
        }
        Ok(())
    });
}

#[test]
fn a_relation_filter() {
    let operators = |root: &texmml::MmlNode| -> Vec<String> {
        collect(root)
            .into_iter()
            .filter(|node| node.kind == NodeKind::Mo)
            .map(|node| node.text().to_owned())
            .collect()
    };

    it("should join adjacent relations", || {
        let root = get_parsed("a<=b", &default_settings())?;
        assert_eq!(operators(&root), ["<="]);
        Ok(())
    });

    it("should keep unclassed operators apart", || {
        let root = get_parsed("\\left(a\\middle|\\middle|b\\right)", &default_settings())?;
        assert_eq!(operators(&root), ["(", "|", "|", ")"]);
        Ok(())
    });
}

#[test]
fn a_matrix_parser() {
    it("should build a table of rows and cells", || {
        let root = get_parsed(
            "\\begin{matrix} a & b \\\\ c & d \\end{matrix}",
            &default_settings(),
        )?;
        assert_eq!(root.children.len(), 1);
        let table = &root.children[0];
        assert_eq!(table.kind, NodeKind::Mtable);
        assert_eq!(table.children.len(), 2);
        for row in &table.children {
            assert_eq!(row.kind, NodeKind::Mtr);
            assert_eq!(row.children.len(), 2);
            assert!(row.children.iter().all(|cell| cell.kind == NodeKind::Mtd));
        }
        assert!(
            collect(&root)
                .iter()
                .all(|node| node.kind != NodeKind::Mlabeledtr)
        );
        Ok(())
    });

    it("should fence pmatrix", || {
        let root = get_parsed("\\begin{pmatrix} a \\end{pmatrix}", &default_settings())?;
        let texts: Vec<&str> = collect(&root)
            .into_iter()
            .filter(|node| node.kind == NodeKind::Mo)
            .map(texmml::MmlNode::text)
            .collect();
        assert_eq!(texts, ["(", ")"]);
        Ok(())
    });

    it("should fail on a missing end", || {
        expect!("\\begin{matrix} a").to_fail_with("EnvMissingEnd", &default_settings())
    });

    it("should fail on mismatched environments", || {
        expect!("\\begin{matrix} a \\end{pmatrix}").not_to_parse(&default_settings())
    });

    it("should fail on an unknown environment", || {
        expect!("\\begin{nowhere} a \\end{nowhere}")
            .to_fail_with("UnknownEnv", &default_settings())
    });
}

#[test]
fn a_group_parser() {
    it("should fail on an extra endgroup", || {
        expect!("\\begingroup\\endgroup\\endgroup")
            .to_fail_with("ExtraEndMissingBegin", &default_settings())
    });

    it("should fail on a missing endgroup", || {
        expect!("\\begingroup x").to_fail_with("MissingEndgroup", &default_settings())
    });

    it("should fail on unbalanced braces", || {
        expect!("{x").to_fail_with("ExtraOpenMissingClose", &default_settings())?;
        expect!("x}").to_fail_with("ExtraCloseMissingOpen", &default_settings())?;
        expect!("{{x}").to_fail_with("ExtraOpenMissingClose", &default_settings())
    });

    it("should fail on unbalanced delimiters", || {
        expect!("\\left(x").to_fail_with("ExtraLeftMissingRight", &default_settings())?;
        expect!("x\\right)").to_fail_with("MissingLeftExtraRight", &default_settings())
    });

    it("should accept balanced input", || {
        for expr in [
            "{x}",
            "{{x}{y}}",
            "\\left(x\\right)",
            "\\left(x\\middle|y\\right)",
            "\\begingroup x \\endgroup",
            "\\begin{matrix} {a} \\end{matrix}",
        ] {
            expect!(expr).to_parse(&default_settings())?;
        }
        Ok(())
    });

    it("should classify structural errors", || {
        let err = get_parsed("x}", &default_settings()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Structural);
        Ok(())
    });
}

#[test]
fn a_control_sequence_parser() {
    it("should fail on undefined control sequences", || {
        expect!("\\zzznotreal").to_fail_with("UndefinedControlSequence", &default_settings())
    });

    it("should parse built-in commands", || {
        assert_eq!(get_single("\\frac{a}{b}")?.kind, NodeKind::Mfrac);
        assert_eq!(get_single("\\sqrt{x}")?.kind, NodeKind::Msqrt);
        assert_eq!(get_single("\\sqrt[3]{x}")?.kind, NodeKind::Mroot);
        Ok(())
    });

    it("should apply math fonts", || {
        let root = get_parsed("\\mathbf{x}", &default_settings())?;
        assert!(
            collect(&root)
                .iter()
                .any(|node| node.kind == NodeKind::Mi && node.get_attr("mathvariant") == Some("bold"))
        );
        Ok(())
    });

    it("should expose the default entry point", || {
        let root = texmml::parse("x+1", true)?;
        assert_eq!(root.get_attr("display"), Some("block"));
        assert_eq!(root.children.len(), 3);
        Ok(())
    });
}

#[test]
fn a_parse_result() {
    it("should be deterministic", || {
        for expr in [
            "A_B^C",
            "\\frac{1}{1+\\frac{1}{x}}",
            "\\left[x\\right]",
            "\\begin{matrix} a & b \\\\ c & d \\end{matrix}",
            "\\def\\x{y}\\x^2",
        ] {
            let first = get_parsed(expr, &default_settings())?;
            let second = get_parsed(expr, &default_settings())?;
            assert_eq!(first, second, "'{expr}' parsed differently twice");
        }
        Ok(())
    });

    it("should record the source of the root", || {
        let root = get_parsed("A_B^C", &default_settings())?;
        assert_eq!(root.provenance.as_deref(), Some("A_B^C"));
        Ok(())
    });

    it("should reparse provenance to the same kind of node", || {
        let root = get_parsed(
            "x+y \\frac{a}{b} A_B^C \\sqrt{x} \\left(x\\right)",
            &default_settings(),
        )?;
        assert!(!root.children.is_empty());
        for child in &root.children {
            let source = child
                .provenance
                .as_deref()
                .unwrap_or_else(|| panic!("no provenance on {child}"));
            let reparsed = get_single(source)?;
            assert_eq!(reparsed.kind, child.kind, "'{source}' changed kind");
        }
        Ok(())
    });
}

#[test]
fn a_macro_definition() {
    it("should forget local definitions at the end of a group", || {
        expect!("{\\def\\x{1}}\\x").to_fail_with("UndefinedControlSequence", &default_settings())
    });

    it("should restore an outer definition", || {
        expect!("\\def\\x{1}{\\def\\x{2}\\x}\\x").to_parse_like("1{2}1", &default_settings())
    });

    it("should keep global definitions", || {
        expect!("{\\gdef\\x{1}}\\x").to_parse_like("{}1", &default_settings())?;
        expect!("{\\global\\def\\x{1}}\\x").to_parse_like("{}1", &default_settings())
    });

    it("should substitute parameters", || {
        expect!("\\def\\sq#1{#1^2}\\sq{x}").to_parse_like("x^2", &default_settings())?;
        expect!("\\def\\x#1.{(#1)}\\x abc.").to_parse_like("(abc)", &default_settings())
    });

    it("should stop a macro that nests itself in an argument", || {
        expect!("\\def\\x{\\frac\\x1}\\x").to_fail_with("MaxNesting", &default_settings())?;
        expect!("\\def\\x{\\sqrt{\\x}}\\x").to_fail_with("MaxNesting", &default_settings())?;
        let err = get_parsed("\\def\\x{\\frac\\x1}\\x", &default_settings()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Semantic);
        Ok(())
    });

    it("should honor the nesting limit", || {
        let shallow = texmml::Settings::builder().max_nesting(2).build();
        expect!("\\frac{\\frac{a}{b}}{c}").to_parse(&shallow)?;
        expect!("\\frac{\\frac{\\frac{a}{b}}{c}}{d}").to_fail_with("MaxNesting", &shallow)?;
        expect!("\\frac{\\frac{\\frac{a}{b}}{c}}{d}").to_parse(&default_settings())
    });

    it("should release the nesting count after a failed parse", || {
        let mut engine = engine(default_settings());
        let err = engine
            .parse("\\def\\x{\\frac\\x1}\\x", ParseEnv::inline())
            .failed()
            .unwrap();
        assert_eq!(err.id(), "MaxNesting");
        assert!(engine.parse("\\frac{\\frac{a}{b}}{c}", ParseEnv::inline()).done().is_some());
        Ok(())
    });

    it("should check parameter numbering", || {
        expect!("\\def\\x#1#3{}").to_fail_with("SequentialParam", &default_settings())?;
        expect!("\\def\\x#a{}").to_fail_with("IllegalParamNumber", &default_settings())
    });

    it("should copy meanings with let", || {
        expect!("\\let\\a=\\alpha \\a").to_parse_like("\\alpha", &default_settings())?;
        expect!("\\let\\b=x \\b").to_parse_like("x", &default_settings())
    });

    it("should refuse prefixes on other commands", || {
        expect!("\\global\\frac{a}{b}")
            .to_fail_with("InvalidTokenAfterMacroPrefix", &default_settings())
    });

    it("should refuse to redefine protected names", || {
        expect!("\\def\\begingroup{x}").to_fail_with("ProtectedRedefinition", &default_settings())
    });

    it("should keep global definitions across parses", || {
        let mut engine = engine(default_settings());
        engine.parse("\\gdef\\y{2}", ParseEnv::inline()).done().unwrap();
        assert!(matches!(
            engine.macro_definition("y"),
            Some(Definition::Macro(_))
        ));
        assert!(engine.parse("\\y", ParseEnv::inline()).done().is_some());
        Ok(())
    });

    it("should drop top-level local definitions between parses", || {
        let mut engine = engine(default_settings());
        engine.parse("\\def\\z{3}\\z", ParseEnv::inline()).done().unwrap();
        assert!(engine.macro_definition("z").is_none());
        let err = engine.parse("\\z", ParseEnv::inline()).failed().unwrap();
        assert_eq!(err.id(), "UndefinedControlSequence");
        Ok(())
    });

    it("should keep top-level local definitions without a global group", || {
        let mut engine = engine(global_group_settings());
        engine.parse("\\def\\z{3}", ParseEnv::inline()).done().unwrap();
        assert!(engine.parse("\\z", ParseEnv::inline()).done().is_some());
        Ok(())
    });

    it("should undo even global definitions in a sandbox", || {
        let mut engine = engine(sandbox_settings());
        engine.parse("\\gdef\\w{1}\\w", ParseEnv::inline()).done().unwrap();
        assert!(engine.macro_definition("w").is_none());
        let err = engine.parse("\\w", ParseEnv::inline()).failed().unwrap();
        assert_eq!(err.id(), "UndefinedControlSequence");
        Ok(())
    });
}

/// `\leavegroup`: closes the innermost namespace frame without a matching
/// stack item.
fn leave_group(parser: &mut TexParser<'_>, _: &str, _: &MacroSpec) -> ParseResult<()> {
    parser.end_group()
}

fn leave_group_engine(settings: texmml::Settings) -> texmml::Engine {
    let mut registry = default_registry().clone();
    registry
        .register(Package {
            macros: vec![HandlerMap::new("leave").with("leavegroup", MacroSpec::new(leave_group))],
            ..Package::new("leave", EXTENSION_PRIORITY)
        })
        .unwrap();
    texmml::Engine::new(registry, settings).unwrap()
}

#[test]
fn a_sandboxed_engine() {
    it("should refuse to close its sandbox from a command", || {
        let mut engine = leave_group_engine(sandbox_settings());
        let err = engine
            .parse("\\gdef\\w{1}\\leavegroup x", ParseEnv::inline())
            .failed()
            .unwrap();
        assert_eq!(err.id(), "SandboxViolation");
        assert_eq!(err.category(), ErrorCategory::Protocol);
        assert!(engine.macro_definition("w").is_none());
        Ok(())
    });

    it("should let the same command close an ordinary group", || {
        let mut engine = leave_group_engine(default_settings());
        assert!(engine.parse("\\leavegroup x", ParseEnv::inline()).done().is_some());
        Ok(())
    });

    it("should stay usable after a refused close", || {
        let mut engine = leave_group_engine(sandbox_settings());
        assert!(engine.parse("\\leavegroup", ParseEnv::inline()).failed().is_some());
        engine.parse("\\gdef\\w{1}\\w", ParseEnv::inline()).done().unwrap();
        assert!(engine.macro_definition("w").is_none());
        Ok(())
    });
}

#[test]
fn a_newcommand_parser() {
    it("should define commands with parameters", || {
        expect!("\\newcommand{\\sq}[1]{#1^2}\\sq{x}").to_parse_like("x^2", &default_settings())
    });

    it("should use the default for an optional first parameter", || {
        expect!("\\newcommand{\\f}[2][a]{#1+#2}\\f{b}").to_parse_like("a+b", &default_settings())?;
        expect!("\\newcommand{\\f}[2][a]{#1+#2}\\f[c]{b}").to_parse_like("c+b", &default_settings())
    });

    it("should refuse to redefine with newcommand", || {
        expect!("\\newcommand{\\frac}{x}").to_fail_with("NewcommandRedefinition", &default_settings())?;
        expect!("\\newcommand{\\q}{x}\\newcommand{\\q}{y}")
            .to_fail_with("NewcommandRedefinition", &default_settings())
    });

    it("should refuse to renew a missing command", || {
        expect!("\\renewcommand{\\nothing}{x}")
            .to_fail_with("RenewcommandNonexistent", &default_settings())?;
        expect!("\\renewcommand{\\alpha}{x}\\alpha").to_parse_like("x", &default_settings())
    });

    it("should leave existing commands alone with providecommand", || {
        expect!("\\providecommand{\\alpha}{x}\\alpha").to_parse_like("\\alpha", &default_settings())?;
        expect!("\\providecommand{\\q}{x}\\q").to_parse_like("x", &default_settings())
    });

    it("should define environments", || {
        expect!("\\newenvironment{paren}{\\left(}{\\right)}\\begin{paren}x\\end{paren}")
            .to_parse_like("\\left(x\\right)", &default_settings())
    });
}

#[test]
fn an_equation_numbering() {
    it("should number consecutive equations", || {
        let mut engine = engine(ams_settings());
        let first = engine
            .parse("\\begin{equation}x\\end{equation}", ParseEnv::display())
            .done()
            .unwrap();
        let second = engine
            .parse("\\begin{equation}y\\end{equation}", ParseEnv::display())
            .done()
            .unwrap();
        assert_eq!(tag_texts(&first), ["(1)"]);
        assert_eq!(tag_texts(&second), ["(2)"]);
        assert!(engine.tags().has_id("mjx-eqn:1"));
        assert!(engine.tags().has_id("mjx-eqn:2"));
        Ok(())
    });

    it("should number rows of align but not align*", || {
        let root = get_parsed_display(
            "\\begin{align} a &= b \\\\ c &= d \\end{align}",
            &ams_settings(),
        )?;
        assert_eq!(tag_texts(&root), ["(1)", "(2)"]);
        let root = get_parsed_display(
            "\\begin{align*} a &= b \\\\ c &= d \\end{align*}",
            &ams_settings(),
        )?;
        assert!(tag_texts(&root).is_empty());
        Ok(())
    });

    it("should leave numbering off by default", || {
        let root = get_parsed_display("\\begin{equation}x\\end{equation}", &default_settings())?;
        assert!(tag_texts(&root).is_empty());
        Ok(())
    });

    it("should number every display with the all policy", || {
        let root = get_parsed_display("x", &all_settings())?;
        assert_eq!(tag_texts(&root), ["(1)"]);
        let root = get_parsed("x", &all_settings())?;
        assert!(tag_texts(&root).is_empty());
        Ok(())
    });

    it("should show explicit tags", || {
        let root = get_parsed_display("\\begin{equation*}x\\tag{A}\\end{equation*}", &ams_settings())?;
        assert_eq!(tag_texts(&root), ["(A)"]);
        let root = get_parsed_display("x\\tag*{B}", &ams_settings())?;
        assert_eq!(tag_texts(&root), ["B"]);
        Ok(())
    });

    it("should refuse a second tag", || {
        expect!("x\\tag{1}\\tag{2}")
            .in_display()
            .to_fail_with("MultipleCommand", &ams_settings())
    });

    it("should refuse nested equations", || {
        expect!("\\begin{equation}\\begin{equation}x\\end{equation}\\end{equation}")
            .in_display()
            .to_fail_with("ErroneousNestingEq", &ams_settings())
    });

    it("should restart after a reset", || {
        let mut engine = engine(ams_settings());
        let input = "\\begin{equation}x\\end{equation}";
        engine.parse(input, ParseEnv::display()).done().unwrap();
        engine.parse(input, ParseEnv::display()).done().unwrap();
        engine.reset_tags(0, false);
        assert!(!engine.tags().has_id("mjx-eqn:1"));
        let root = engine.parse(input, ParseEnv::display()).done().unwrap();
        assert_eq!(tag_texts(&root), ["(1)"]);
        Ok(())
    });
}

#[test]
fn a_label_reference() {
    it("should resolve references to earlier labels", || {
        let mut engine = engine(ams_settings());
        engine
            .parse("\\begin{equation}x\\label{eq}\\end{equation}", ParseEnv::display())
            .done()
            .unwrap();
        let label = engine.tags().lookup("eq").unwrap();
        assert_eq!(label.tag, "1");
        assert_eq!(label.id, "mjx-eqn:eq");

        let root = engine.parse("\\eqref{eq}", ParseEnv::inline()).done().unwrap();
        let link = &root.children[0];
        assert_eq!(link.get_attr("href"), Some("#mjx-eqn%3Aeq"));
        assert_eq!(link.children[0].text(), "(1)");
        assert!(!engine.tags().needs_rerun());
        Ok(())
    });

    it("should mark unknown references for a rerun", || {
        let mut engine = engine(ams_settings());
        let root = engine.parse("\\ref{later}", ParseEnv::inline()).done().unwrap();
        assert_eq!(root.children[0].children[0].text(), "???");
        assert!(engine.tags().needs_rerun());
        Ok(())
    });

    it("should refuse duplicate labels", || {
        let mut engine = engine(ams_settings());
        engine
            .parse("\\begin{equation}x\\label{a}\\end{equation}", ParseEnv::display())
            .done()
            .unwrap();
        let err = engine
            .parse("\\begin{equation}y\\label{a}\\end{equation}", ParseEnv::display())
            .failed()
            .unwrap();
        assert_eq!(err.id(), "MultipleLabel");
        assert_eq!(err.category(), ErrorCategory::Numbering);
        Ok(())
    });

    it("should keep labels through a reset when asked", || {
        let mut engine = engine(ams_settings());
        engine
            .parse("\\begin{equation}x\\label{kept}\\end{equation}", ParseEnv::display())
            .done()
            .unwrap();
        engine.reset_tags(0, true);
        assert!(engine.tags().lookup("kept").is_some());
        engine.reset_tags(0, false);
        assert!(engine.tags().lookup("kept").is_none());
        Ok(())
    });
}

/// Numbers displays automatically but refuses explicit tags.
#[derive(Debug)]
struct NumbersOnly;

impl TagPolicy for NumbersOnly {
    fn name(&self) -> &'static str {
        "numbers-only"
    }

    fn supports(&self, operation: TagOperation) -> bool {
        operation != TagOperation::Tag
    }
}

fn numbers_only() -> Box<dyn TagPolicy> {
    Box::new(NumbersOnly)
}

#[test]
fn a_tag_policy() {
    it("should be selectable from a package", || {
        let mut registry = default_registry().clone();
        registry.register(Package {
            tag_policies: vec![(
                "numbers-only".to_owned(),
                numbers_only as TagPolicyConstructor,
            )],
            ..Package::new("numbers-only", EXTENSION_PRIORITY)
        })?;
        let settings = texmml::Settings::builder()
            .tags("numbers-only".to_owned())
            .build();
        let mut engine = texmml::Engine::new(registry, settings)?;

        let root = engine
            .parse("\\begin{equation}x\\end{equation}", ParseEnv::display())
            .done()
            .unwrap();
        assert_eq!(tag_texts(&root), ["(1)"]);

        let err = engine
            .parse("x\\tag{1}", ParseEnv::display())
            .failed()
            .unwrap();
        assert_eq!(err.id(), "IncompatibleTagPolicy");
        Ok(())
    });
}

#[test]
fn a_color_command() {
    it("should suspend until the color package is loaded", || {
        let mut engine = engine(default_settings());
        let pending = engine
            .parse("\\color{red}{x}", ParseEnv::inline())
            .pending()
            .unwrap();
        assert_eq!(
            pending.resolution,
            Resolution::Package(packages::color::NAME.to_owned())
        );
        assert_eq!(pending.attempt, 1);
        engine.resolve(&pending.resolution)?;
        let resumed = engine.resume(pending).done().unwrap();
        assert_eq!(engine.retry_count(), 1);

        let mut direct = texmml::Engine::new(default_registry().clone(), default_settings())?;
        direct.register(packages::color::package())?;
        let parsed = direct
            .parse("\\color{red}{x}", ParseEnv::inline())
            .done()
            .unwrap();
        assert_eq!(resumed, parsed);
        Ok(())
    });

    it("should color the rest of the group", || {
        let root = get_parsed("{\\color{red} x y} z", &default_settings())?;
        let styles: Vec<_> = collect(&root)
            .into_iter()
            .filter(|node| node.kind == NodeKind::Mstyle)
            .collect();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].get_attr("mathcolor"), Some("red"));
        Ok(())
    });

    it("should convert color models", || {
        let root = get_parsed("\\textcolor[rgb]{1,0,0}{x}", &default_settings())?;
        assert_eq!(root.children[0].get_attr("mathcolor"), Some("#FF0000"));
        let root = get_parsed("\\definecolor{mine}{RGB}{0,128,255}\\color{mine}x", &default_settings())?;
        assert!(
            collect(&root)
                .iter()
                .any(|node| node.get_attr("mathcolor") == Some("#0080FF"))
        );
        Ok(())
    });

    it("should keep defined colors across parses", || {
        let mut engine = engine(default_settings());
        engine.drive("\\definecolor{brand}{gray}{0}", ParseEnv::inline(), |_| Ok(None))?;
        let root = engine.drive("\\textcolor{brand}{x}", ParseEnv::inline(), |_| Ok(None))?;
        assert_eq!(root.children[0].get_attr("mathcolor"), Some("#000000"));
        Ok(())
    });

    it("should refuse unknown models and bad values", || {
        expect!("\\color[cmyk]{0,0,0,1}x").to_fail_with("UndefinedColorModel", &default_settings())?;
        expect!("\\color[rgb]{2,0,0}x").to_fail_with("InvalidColorValue", &default_settings())
    });
}

#[test]
fn a_retried_parse() {
    it("should discard everything an abandoned attempt did", || {
        let mut engine = engine(ams_settings());
        let input = "\\gdef\\leak{1}\\begin{equation}x\\end{equation}\\require{extra}";
        let pending = engine.parse(input, ParseEnv::display()).pending().unwrap();
        assert_eq!(pending.resolution, Resolution::Package("extra".to_owned()));
        assert!(engine.macro_definition("leak").is_none());
        assert!(!engine.tags().has_id("mjx-eqn:1"));

        engine.register(Package::new("extra", EXTENSION_PRIORITY))?;
        let root = engine.resume(pending).done().unwrap();
        assert!(engine.macro_definition("leak").is_some());
        assert_eq!(tag_texts(&root), ["(1)"]);
        Ok(())
    });

    it("should let the host provide packages", || {
        let mut engine = engine(default_settings());
        let mut asked = Vec::new();
        let root = engine.drive("\\require{extra}x", ParseEnv::inline(), |resolution| {
            asked.push(resolution.clone());
            Ok(Some(Package::new("extra", EXTENSION_PRIORITY)))
        })?;
        assert_eq!(asked, [Resolution::Package("extra".to_owned())]);
        assert_eq!(root.children.len(), 1);
        Ok(())
    });

    it("should fail on packages nobody provides", || {
        expect!("\\require{nowhere}").to_fail_with("UnknownPackage", &default_settings())
    });

    it("should not suspend on registered packages", || {
        let mut engine = engine(default_settings());
        assert!(
            engine
                .parse("\\require{ams}x", ParseEnv::inline())
                .done()
                .is_some()
        );
        Ok(())
    });

    it("should stop after too many retries", || {
        let settings = texmml::Settings::builder().max_retries(0).build();
        let mut engine = engine(settings);
        let pending = engine
            .parse("\\require{color}x", ParseEnv::inline())
            .pending()
            .unwrap();
        engine.resolve(&pending.resolution)?;
        let err = engine.resume(pending).failed().unwrap();
        assert_eq!(err.id(), "TooManyRetries");
        assert_eq!(err.category(), ErrorCategory::Protocol);
        Ok(())
    });
}
