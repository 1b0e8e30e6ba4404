//! User definitions made with `\def`, `\newcommand`, `\let` and friends.

/// A macro body with its parameter layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    /// Replacement text, with `#1`..`#9` standing for the arguments.
    pub body: String,
    /// Number of parameters.
    pub params: usize,
    /// Default for an optional first argument (`\newcommand\x[2][a]{..}`).
    pub default: Option<String>,
    /// Delimiter text of a `\def` template: the literal text that must
    /// precede the first argument, then the text ending each argument. Empty
    /// for undelimited parameters.
    pub delimiters: Vec<String>,
}

impl MacroDef {
    /// A macro taking `params` braced arguments.
    #[must_use]
    pub fn new(body: &str, params: usize) -> Self {
        Self {
            body: body.to_owned(),
            params,
            default: None,
            delimiters: Vec::new(),
        }
    }
}

/// An environment made with `\newenvironment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentDef {
    /// Text inserted at `\begin`.
    pub begin: String,
    /// Text inserted at `\end`.
    pub end: String,
    /// Number of parameters, taken at `\begin`.
    pub params: usize,
    /// Default for an optional first argument.
    pub default: Option<String>,
}

/// What a name in the parse namespace stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    /// A user macro.
    Macro(MacroDef),
    /// A user environment, stored under [`env_key`].
    Environment(EnvironmentDef),
    /// Behaves like the built-in control sequence of that name.
    Alias(String),
    /// Behaves like the character, as if typed.
    Char(char),
}

/// Namespace key of the environment `name`. Environments share the namespace
/// with control sequences so both follow the same grouping.
#[must_use]
pub fn env_key(name: &str) -> String {
    format!("{{{name}}}")
}

/// Replaces `#n` in `body` by the `n`th argument and `##` by `#`.
///
/// An argument ending in a control word gets a separating space when a letter
/// follows it in the body.
#[must_use]
pub fn substitute(body: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '#' => match chars.peek().copied() {
                Some('#') => {
                    chars.next();
                    out.push('#');
                }
                Some(d @ '1'..='9') => {
                    chars.next();
                    let n = d as usize - '1' as usize;
                    match args.get(n) {
                        Some(arg) => {
                            out.push_str(arg);
                            if ends_with_control_word(arg)
                                && chars.peek().is_some_and(char::is_ascii_alphabetic)
                            {
                                out.push(' ');
                            }
                        }
                        None => {
                            out.push('#');
                            out.push(d);
                        }
                    }
                }
                _ => out.push('#'),
            },
            _ => out.push(c),
        }
    }
    out
}

/// Whether `text` ends in a control word such as `\alpha`.
#[must_use]
pub fn ends_with_control_word(text: &str) -> bool {
    let word = text.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    word.len() < text.len() && word.ends_with('\\') && !word.ends_with("\\\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute() {
        let args = ["a".to_owned(), "\\beta".to_owned()];
        assert_eq!(substitute("#1+#2", &args), "a+\\beta");
        assert_eq!(substitute("#2x", &args), "\\beta x");
        assert_eq!(substitute("##1 \\#1", &args), "#1 \\#1");
        assert_eq!(substitute("#3", &args), "#3");
    }

    #[test]
    fn test_control_word_end() {
        assert!(ends_with_control_word("x\\alpha"));
        assert!(!ends_with_control_word("\\alpha1"));
        assert!(!ends_with_control_word("\\\\ab"));
        assert!(!ends_with_control_word("ab"));
    }
}
