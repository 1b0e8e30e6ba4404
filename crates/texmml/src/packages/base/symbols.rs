//! Static symbol tables of the base package.
//!
//! Macro tables are keyed by control sequence name without the backslash.
//! Operator entries carry `[text, class]`; large operators carry
//! `[text, "limits" | ""]`.

use crate::types::TexClass;

/// Lowercase Greek, italic identifiers.
pub static GREEK: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "alpha" => "\u{03B1}",
    "beta" => "\u{03B2}",
    "gamma" => "\u{03B3}",
    "delta" => "\u{03B4}",
    "epsilon" => "\u{03F5}",
    "zeta" => "\u{03B6}",
    "eta" => "\u{03B7}",
    "theta" => "\u{03B8}",
    "iota" => "\u{03B9}",
    "kappa" => "\u{03BA}",
    "lambda" => "\u{03BB}",
    "mu" => "\u{03BC}",
    "nu" => "\u{03BD}",
    "xi" => "\u{03BE}",
    "omicron" => "\u{03BF}",
    "pi" => "\u{03C0}",
    "rho" => "\u{03C1}",
    "sigma" => "\u{03C3}",
    "tau" => "\u{03C4}",
    "upsilon" => "\u{03C5}",
    "phi" => "\u{03D5}",
    "chi" => "\u{03C7}",
    "psi" => "\u{03C8}",
    "omega" => "\u{03C9}",
    "varepsilon" => "\u{03B5}",
    "vartheta" => "\u{03D1}",
    "varpi" => "\u{03D6}",
    "varrho" => "\u{03F1}",
    "varsigma" => "\u{03C2}",
    "varphi" => "\u{03C6}",
};

/// Uppercase Greek, upright identifiers.
pub static UPPER_GREEK: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "Gamma" => "\u{0393}",
    "Delta" => "\u{0394}",
    "Theta" => "\u{0398}",
    "Lambda" => "\u{039B}",
    "Xi" => "\u{039E}",
    "Pi" => "\u{03A0}",
    "Sigma" => "\u{03A3}",
    "Upsilon" => "\u{03A5}",
    "Phi" => "\u{03A6}",
    "Psi" => "\u{03A8}",
    "Omega" => "\u{03A9}",
};

/// Ordinary symbols set as identifiers.
pub static ORD_IDENTIFIERS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "infty" => "\u{221E}",
    "partial" => "\u{2202}",
    "nabla" => "\u{2207}",
    "ell" => "\u{2113}",
    "hbar" => "\u{210F}",
    "imath" => "\u{0131}",
    "jmath" => "\u{0237}",
    "aleph" => "\u{2135}",
    "Re" => "\u{211C}",
    "Im" => "\u{2111}",
    "wp" => "\u{2118}",
    "emptyset" => "\u{2205}",
};

/// Operators with their spacing class.
pub static OPERATORS: phf::Map<&'static str, &'static [&'static str]> = phf::phf_map! {
    // binary
    "pm" => &["\u{00B1}", "BIN"],
    "mp" => &["\u{2213}", "BIN"],
    "times" => &["\u{00D7}", "BIN"],
    "div" => &["\u{00F7}", "BIN"],
    "cdot" => &["\u{22C5}", "BIN"],
    "ast" => &["\u{2217}", "BIN"],
    "star" => &["\u{22C6}", "BIN"],
    "circ" => &["\u{2218}", "BIN"],
    "bullet" => &["\u{2219}", "BIN"],
    "cap" => &["\u{2229}", "BIN"],
    "cup" => &["\u{222A}", "BIN"],
    "wedge" => &["\u{2227}", "BIN"],
    "land" => &["\u{2227}", "BIN"],
    "vee" => &["\u{2228}", "BIN"],
    "lor" => &["\u{2228}", "BIN"],
    "setminus" => &["\u{2216}", "BIN"],
    "oplus" => &["\u{2295}", "BIN"],
    "ominus" => &["\u{2296}", "BIN"],
    "otimes" => &["\u{2297}", "BIN"],
    "oslash" => &["\u{2298}", "BIN"],
    "odot" => &["\u{2299}", "BIN"],
    // relations
    "leq" => &["\u{2264}", "REL"],
    "le" => &["\u{2264}", "REL"],
    "geq" => &["\u{2265}", "REL"],
    "ge" => &["\u{2265}", "REL"],
    "neq" => &["\u{2260}", "REL"],
    "ne" => &["\u{2260}", "REL"],
    "equiv" => &["\u{2261}", "REL"],
    "approx" => &["\u{2248}", "REL"],
    "sim" => &["\u{223C}", "REL"],
    "simeq" => &["\u{2243}", "REL"],
    "cong" => &["\u{2245}", "REL"],
    "propto" => &["\u{221D}", "REL"],
    "ll" => &["\u{226A}", "REL"],
    "gg" => &["\u{226B}", "REL"],
    "in" => &["\u{2208}", "REL"],
    "ni" => &["\u{220B}", "REL"],
    "notin" => &["\u{2209}", "REL"],
    "subset" => &["\u{2282}", "REL"],
    "supset" => &["\u{2283}", "REL"],
    "subseteq" => &["\u{2286}", "REL"],
    "supseteq" => &["\u{2287}", "REL"],
    "mid" => &["\u{2223}", "REL"],
    "parallel" => &["\u{2225}", "REL"],
    "perp" => &["\u{22A5}", "REL"],
    "models" => &["\u{22A8}", "REL"],
    "vdash" => &["\u{22A2}", "REL"],
    "dashv" => &["\u{22A3}", "REL"],
    // arrows
    "to" => &["\u{2192}", "REL"],
    "rightarrow" => &["\u{2192}", "REL"],
    "leftarrow" => &["\u{2190}", "REL"],
    "gets" => &["\u{2190}", "REL"],
    "leftrightarrow" => &["\u{2194}", "REL"],
    "Rightarrow" => &["\u{21D2}", "REL"],
    "Leftarrow" => &["\u{21D0}", "REL"],
    "Leftrightarrow" => &["\u{21D4}", "REL"],
    "implies" => &["\u{27F9}", "REL"],
    "iff" => &["\u{27FA}", "REL"],
    "mapsto" => &["\u{21A6}", "REL"],
    "longrightarrow" => &["\u{27F6}", "REL"],
    "longleftarrow" => &["\u{27F5}", "REL"],
    "uparrow" => &["\u{2191}", "REL"],
    "downarrow" => &["\u{2193}", "REL"],
    "hookrightarrow" => &["\u{21AA}", "REL"],
    // ordinary
    "forall" => &["\u{2200}", "ORD"],
    "exists" => &["\u{2203}", "ORD"],
    "neg" => &["\u{00AC}", "ORD"],
    "lnot" => &["\u{00AC}", "ORD"],
    "prime" => &["\u{2032}", "ORD"],
    "angle" => &["\u{2220}", "ORD"],
    "triangle" => &["\u{25B3}", "ORD"],
    "backslash" => &["\\", "ORD"],
    "vert" => &["|", "ORD"],
    "Vert" => &["\u{2016}", "ORD"],
    "|" => &["\u{2016}", "ORD"],
    "ldots" => &["\u{2026}", "INNER"],
    "dots" => &["\u{2026}", "INNER"],
    "cdots" => &["\u{22EF}", "INNER"],
    "vdots" => &["\u{22EE}", "ORD"],
    "ddots" => &["\u{22F1}", "INNER"],
    "#" => &["#", "ORD"],
    "$" => &["$", "ORD"],
    "%" => &["%", "ORD"],
    "&" => &["&", "ORD"],
    "_" => &["_", "ORD"],
    // fences
    "{" => &["{", "OPEN"],
    "}" => &["}", "CLOSE"],
    "lbrace" => &["{", "OPEN"],
    "rbrace" => &["}", "CLOSE"],
    "langle" => &["\u{27E8}", "OPEN"],
    "rangle" => &["\u{27E9}", "CLOSE"],
    "lfloor" => &["\u{230A}", "OPEN"],
    "rfloor" => &["\u{230B}", "CLOSE"],
    "lceil" => &["\u{2308}", "OPEN"],
    "rceil" => &["\u{2309}", "CLOSE"],
    "lvert" => &["|", "OPEN"],
    "rvert" => &["|", "CLOSE"],
    "lVert" => &["\u{2016}", "OPEN"],
    "rVert" => &["\u{2016}", "CLOSE"],
    // punctuation
    "colon" => &[":", "PUNCT"],
};

/// Large operators. `limits` marks operators whose scripts move above and
/// below in display style.
pub static LARGE_OPS: phf::Map<&'static str, &'static [&'static str]> = phf::phf_map! {
    "sum" => &["\u{2211}", "limits"],
    "prod" => &["\u{220F}", "limits"],
    "coprod" => &["\u{2210}", "limits"],
    "bigcup" => &["\u{22C3}", "limits"],
    "bigcap" => &["\u{22C2}", "limits"],
    "bigvee" => &["\u{22C1}", "limits"],
    "bigwedge" => &["\u{22C0}", "limits"],
    "bigoplus" => &["\u{2A01}", "limits"],
    "bigotimes" => &["\u{2A02}", "limits"],
    "int" => &["\u{222B}", ""],
    "iint" => &["\u{222C}", ""],
    "iiint" => &["\u{222D}", ""],
    "oint" => &["\u{222E}", ""],
};

/// Named functions followed by an invisible function application.
pub static NAMED_FUNCTIONS: phf::Set<&'static str> = phf::phf_set! {
    "sin", "cos", "tan", "cot", "sec", "csc",
    "arcsin", "arccos", "arctan",
    "sinh", "cosh", "tanh", "coth",
    "log", "ln", "lg", "exp",
    "arg", "deg", "dim", "hom", "ker",
};

/// Named operators taking limits.
pub static NAMED_OPERATORS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "lim" => "lim",
    "limsup" => "lim\u{2006}sup",
    "liminf" => "lim\u{2006}inf",
    "max" => "max",
    "min" => "min",
    "sup" => "sup",
    "inf" => "inf",
    "det" => "det",
    "gcd" => "gcd",
    "Pr" => "Pr",
};

/// Accents: `[mark, stretchy]`.
pub static ACCENTS: phf::Map<&'static str, &'static [&'static str]> = phf::phf_map! {
    "hat" => &["\u{02C6}", "false"],
    "check" => &["\u{02C7}", "false"],
    "tilde" => &["\u{02DC}", "false"],
    "acute" => &["\u{02CA}", "false"],
    "grave" => &["\u{02CB}", "false"],
    "dot" => &["\u{02D9}", "false"],
    "ddot" => &["\u{00A8}", "false"],
    "breve" => &["\u{02D8}", "false"],
    "bar" => &["\u{02C9}", "false"],
    "vec" => &["\u{2192}", "false"],
    "widehat" => &["\u{02C6}", "true"],
    "widetilde" => &["\u{02DC}", "true"],
    "overrightarrow" => &["\u{2192}", "true"],
    "overleftarrow" => &["\u{2190}", "true"],
};

/// Delimiters accepted by `\left`, `\right` and the `\big` family, keyed by
/// the token as written.
pub static DELIMITERS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "." => "",
    "(" => "(",
    ")" => ")",
    "[" => "[",
    "]" => "]",
    "<" => "\u{27E8}",
    ">" => "\u{27E9}",
    "/" => "/",
    "|" => "|",
    "\\|" => "\u{2016}",
    "\\{" => "{",
    "\\}" => "}",
    "\\lbrace" => "{",
    "\\rbrace" => "}",
    "\\langle" => "\u{27E8}",
    "\\rangle" => "\u{27E9}",
    "\\lfloor" => "\u{230A}",
    "\\rfloor" => "\u{230B}",
    "\\lceil" => "\u{2308}",
    "\\rceil" => "\u{2309}",
    "\\vert" => "|",
    "\\Vert" => "\u{2016}",
    "\\lvert" => "|",
    "\\rvert" => "|",
    "\\lVert" => "\u{2016}",
    "\\rVert" => "\u{2016}",
    "\\backslash" => "\\",
    "\\uparrow" => "\u{2191}",
    "\\downarrow" => "\u{2193}",
    "\\updownarrow" => "\u{2195}",
    "\\Uparrow" => "\u{21D1}",
    "\\Downarrow" => "\u{21D3}",
};

/// Single characters typed as operators, with their spacing class.
pub static OPERATOR_CHARS: phf::Map<&'static str, (&'static str, TexClass)> = phf::phf_map! {
    "+" => ("+", TexClass::Bin),
    "-" => ("\u{2212}", TexClass::Bin),
    "*" => ("\u{2217}", TexClass::Bin),
    "=" => ("=", TexClass::Rel),
    "<" => ("<", TexClass::Rel),
    ">" => (">", TexClass::Rel),
    ":" => (":", TexClass::Rel),
    "," => (",", TexClass::Punct),
    ";" => (";", TexClass::Punct),
    "(" => ("(", TexClass::Open),
    "[" => ("[", TexClass::Open),
    ")" => (")", TexClass::Close),
    "]" => ("]", TexClass::Close),
    "!" => ("!", TexClass::Close),
    "?" => ("?", TexClass::Close),
    "|" => ("|", TexClass::Ord),
    "/" => ("/", TexClass::Ord),
    "." => (".", TexClass::Ord),
    "@" => ("@", TexClass::Ord),
    "\"" => ("\u{2033}", TexClass::Ord),
};
