//! Scanning primitives shared by the parser and the macro handlers.
//!
//! These functions look at the front of a string slice and report how many
//! bytes a lexeme occupies. None of them allocate unless they return owned
//! text; the parser keeps the cursor.

/// Returns the byte length of the leading run of TeX whitespace.
#[must_use]
pub fn match_space(s: &str) -> Option<usize> {
    let len: usize = s
        .chars()
        .take_while(|c| matches!(c, ' ' | '\r' | '\n' | '\t'))
        .map(char::len_utf8)
        .sum();
    (len > 0).then_some(len)
}

/// Whether `c` is TeX whitespace.
#[must_use]
pub const fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\r' | '\n' | '\t')
}

/// Whether `c` may appear in a control word.
#[must_use]
pub const fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Scans a control sequence name from `rest`, which starts right after the
/// backslash.
///
/// A control word is a run of ASCII letters and swallows one following space;
/// anything else is a one-character control symbol. Returns the name and the
/// number of bytes consumed. At end of input the name is a space and nothing
/// is consumed.
#[must_use]
pub fn scan_cs_name(rest: &str) -> (&str, usize) {
    let word: usize = rest
        .chars()
        .take_while(|c| is_letter(*c))
        .map(char::len_utf8)
        .sum();
    if word > 0 {
        let skip = usize::from(rest[word..].starts_with(' '));
        return (&rest[..word], word + skip);
    }
    rest.chars()
        .next()
        .map_or((" ", 0), |c| (&rest[..c.len_utf8()], c.len_utf8()))
}

/// Length of a decimal number at the front of `s`: digits with an optional
/// fraction, or a bare fraction. Digit groups written as `{,}ddd` are part
/// of the number.
#[must_use]
pub fn match_number(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };
    let mut len = digits(0);
    if len > 0 {
        while s[len..].starts_with("{,}") && digits(len + 3) == 3 {
            len += 6;
        }
        if bytes.get(len) == Some(&b'.') {
            len += 1 + digits(len + 1);
        }
        return Some(len);
    }
    if bytes.first() == Some(&b'.') {
        let frac = digits(1);
        return (frac > 0).then_some(1 + frac);
    }
    None
}

/// Return TeX points per unit for absolute TeX units.
#[must_use]
pub fn pt_per_unit(unit: &str) -> Option<f64> {
    match unit {
        "pt" => Some(1.0),
        "mm" => Some(7227.0 / 2540.0),
        "cm" => Some(7227.0 / 254.0),
        "in" => Some(72.27),
        "bp" | "px" => Some(803.0 / 800.0),
        "pc" => Some(12.0),
        "dd" => Some(1238.0 / 1157.0),
        "cc" => Some(14856.0 / 1157.0),
        "sp" => Some(1.0 / 65536.0),
        _ => None,
    }
}

/// Check whether a unit string is a length unit the engine understands.
#[must_use]
pub fn valid_unit(unit: &str) -> bool {
    pt_per_unit(unit).is_some() || matches!(unit, "ex" | "em" | "mu")
}

/// A dimension such as `-1.5em`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    /// Signed magnitude as written (normalized to start with a digit).
    pub value: String,
    /// Two-letter unit.
    pub unit: String,
    /// Bytes consumed from the input, including surrounding spaces.
    pub len: usize,
}

impl Dimension {
    /// `value` and `unit` glued back together.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!("{}{}", self.value, self.unit)
    }
}

/// Parses a dimension at the front of `s`. With `rest` unset the whole string
/// must be the dimension (surrounding spaces allowed).
#[must_use]
pub fn match_dimen(s: &str, rest: bool) -> Option<Dimension> {
    let mut pos = s.len() - s.trim_start().len();
    let mut value = String::new();
    if let Some(sign @ ('+' | '-')) = s[pos..].chars().next() {
        if sign == '-' {
            value.push('-');
        }
        pos += 1;
    }
    pos += s[pos..].len() - s[pos..].trim_start().len();

    let bytes = s.as_bytes();
    let int_len = bytes[pos..].iter().take_while(|b| b.is_ascii_digit()).count();
    let mut number = s[pos..pos + int_len].to_owned();
    pos += int_len;
    if bytes.get(pos) == Some(&b'.') {
        let frac_len = bytes[pos + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if int_len == 0 && frac_len == 0 {
            return None;
        }
        if int_len == 0 {
            number.push('0');
        }
        number.push_str(&s[pos..=pos + frac_len]);
        pos += 1 + frac_len;
    } else if int_len == 0 {
        return None;
    }
    value.push_str(&number);
    pos += s[pos..].len() - s[pos..].trim_start().len();

    let unit = s.get(pos..pos + 2)?;
    if !unit.bytes().all(|b| b.is_ascii_lowercase()) || !valid_unit(unit) {
        return None;
    }
    pos += 2;
    let trailing = s[pos..].len() - s[pos..].trim_start().len();
    if !rest && pos + trailing != s.len() {
        return None;
    }
    Some(Dimension {
        value,
        unit: unit.to_owned(),
        len: pos + trailing,
    })
}

/// Highest `#n` parameter referenced in a macro body.
#[must_use]
pub fn parameter_count(body: &str) -> usize {
    let mut max = 0;
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '#' => {
                if let Some(n) = chars.peek().and_then(|d| d.to_digit(10)) {
                    max = max.max(n as usize);
                    chars.next();
                }
            }
            _ => {}
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_words_swallow_one_space() {
        assert_eq!(scan_cs_name("alpha  x"), ("alpha", 6));
        assert_eq!(scan_cs_name("alpha2"), ("alpha", 5));
        assert_eq!(scan_cs_name(",x"), (",", 1));
        assert_eq!(scan_cs_name(""), (" ", 0));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(match_number("123+"), Some(3));
        assert_eq!(match_number("3.14x"), Some(4));
        assert_eq!(match_number(".5"), Some(2));
        assert_eq!(match_number("1{,}000"), Some(7));
        assert_eq!(match_number("x"), None);
        assert_eq!(match_number("."), None);
    }

    #[test]
    fn test_dimensions() {
        let dim = match_dimen(" -1.5 em ", false).unwrap();
        assert_eq!(dim.to_css(), "-1.5em");
        assert!(match_dimen("3 furlongs", false).is_none());
        assert!(match_dimen("3pt and more", false).is_none());
        let dim = match_dimen(".5ex and more", true).unwrap();
        assert_eq!(dim.to_css(), "0.5ex");
        assert_eq!(dim.len, 4);
    }

    #[test]
    fn test_parameter_count() {
        assert_eq!(parameter_count("#1 + #2"), 2);
        assert_eq!(parameter_count(r"\#3 #1"), 1);
        assert_eq!(parameter_count("x"), 0);
    }
}
