use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use texmml::{Engine, KeyMap, ParseEnv, Registry, Settings, packages};

struct Case {
    name: &'static str,
    tex: &'static str,
    display: bool,
    macros: &'static [(&'static str, &'static str)],
}

static CASES: [Case; 7] = [
    Case {
        name: "Scripts",
        tex: "\\sum_{i=1}^{n} a_i^2 + \\int_0^\\infty e^{-x^2}\\,dx",
        display: true,
        macros: &[],
    },
    Case {
        name: "Fractions",
        tex: "\\frac{1}{1+\\frac{1}{1+\\frac{1}{1+x}}} = \\sqrt[3]{\\dfrac{a}{b}}",
        display: false,
        macros: &[],
    },
    Case {
        name: "Delimiters",
        tex: "\\left( \\left[ x \\middle| y \\right] \\right) \\bigl( z \\bigr)",
        display: false,
        macros: &[],
    },
    Case {
        name: "Matrix",
        tex: "\\begin{pmatrix} a & b & c \\\\ d & e & f \\\\ g & h & i \\end{pmatrix}",
        display: true,
        macros: &[],
    },
    Case {
        name: "Align",
        tex: "\\begin{align} f(x) &= (x+1)^2 \\\\ &= x^2 + 2x + 1 \\label{expand} \\end{align}",
        display: true,
        macros: &[],
    },
    Case {
        name: "UserMacros",
        tex: "\\newcommand{\\norm}[1]{\\left\\|#1\\right\\|} \\norm{\\vec v} \\le \\R",
        display: false,
        macros: &[("R", "\\mathbb{R}"), ("vec", "\\mathbf{#1}")],
    },
    Case {
        name: "Text",
        tex: "\\text{if } x > 0 \\text{ and $y$ is odd}",
        display: false,
        macros: &[],
    },
];

fn build_settings(case: &Case) -> Settings {
    let macros: KeyMap<String, String> = case
        .macros
        .iter()
        .map(|(name, body)| ((*name).to_owned(), (*body).to_owned()))
        .collect();
    Settings::builder().tags("ams".to_owned()).macros(macros).build()
}

fn bench_parsing(c: &mut Criterion) {
    let registry = Arc::new(packages::default_registry().expect("failed to build the default registry"));

    let mut group = c.benchmark_group("texmml_parse");
    for case in &CASES {
        let registry: Arc<Registry> = Arc::clone(&registry);
        let settings = build_settings(case);
        let env = if case.display {
            ParseEnv::display()
        } else {
            ParseEnv::inline()
        };

        // Make sure the case parses before measuring it.
        Engine::new(registry.as_ref().clone(), settings.clone())
            .expect("engine construction failed")
            .drive(case.tex, env, |_| Ok(None))
            .expect("parsing failed while priming the benchmark");

        group.bench_function(case.name, move |b| {
            b.iter(|| {
                let mut engine = Engine::new(registry.as_ref().clone(), settings.clone())
                    .expect("engine construction failed");
                let root = engine
                    .drive(case.tex, env, |_| Ok(None))
                    .expect("parsing failed during benchmark");
                black_box(root.children.len());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parsing);
criterion_main!(benches);
