use core::fmt::{self, Write as _};

use strum::{AsRefStr, Display};

/// Tag operations a policy may refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum TagOperation {
    /// `\tag`, `\tag*`
    #[strum(serialize = "\\tag")]
    Tag,
    /// `\notag`, `\nonumber`
    #[strum(serialize = "\\notag")]
    NoTag,
    /// `\label`
    #[strum(serialize = "\\label")]
    Label,
    /// `\ref`, `\eqref`
    #[strum(serialize = "\\ref")]
    Ref,
}

/// A numbering scheme.
///
/// The manager owns the counters and the label tables; a policy only decides
/// when numbers are handed out and how tags, ids and links are spelled.
pub trait TagPolicy: fmt::Debug + Send + Sync {
    /// Name the policy is selected by.
    fn name(&self) -> &str;

    /// Whether environments that number by default get automatic numbers.
    fn auto_numbers(&self) -> bool {
        true
    }

    /// Whether every displayed formula is numbered, even outside numbering
    /// environments.
    fn tags_every_display(&self) -> bool {
        false
    }

    /// Whether `operation` is meaningful under this policy.
    fn supports(&self, operation: TagOperation) -> bool {
        let _ = operation;
        true
    }

    /// Text of the `n`th automatic number.
    fn format_number(&self, n: usize) -> String {
        n.to_string()
    }

    /// Displayed form of a tag.
    fn format_tag(&self, tag: &str) -> String {
        format!("({tag})")
    }

    /// Element id for a tag or label.
    fn format_id(&self, id: &str) -> String {
        let id: String = id
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        format!("mjx-eqn:{id}")
    }

    /// Link target for a reference to `id`.
    fn format_url(&self, id: &str, base_url: &str) -> String {
        let mut url = format!("{base_url}#");
        for b in id.bytes() {
            if b.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&b) {
                url.push(char::from(b));
            } else {
                let _ = write!(url, "%{b:02X}");
            }
        }
        url
    }
}

/// Only explicit `\tag`s are shown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTags;

impl TagPolicy for NoTags {
    fn name(&self) -> &'static str {
        "none"
    }

    fn auto_numbers(&self) -> bool {
        false
    }
}

/// AMS numbering: numbering environments count, starred ones do not.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmsTags;

impl TagPolicy for AmsTags {
    fn name(&self) -> &'static str {
        "ams"
    }
}

/// Every displayed formula is numbered.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllTags;

impl TagPolicy for AllTags {
    fn name(&self) -> &'static str {
        "all"
    }

    fn tags_every_display(&self) -> bool {
        true
    }
}

/// Constructor for the `none` policy.
#[must_use]
pub fn no_tags() -> Box<dyn TagPolicy> {
    Box::new(NoTags)
}

/// Constructor for the `ams` policy.
#[must_use]
pub fn ams_tags() -> Box<dyn TagPolicy> {
    Box::new(AmsTags)
}

/// Constructor for the `all` policy.
#[must_use]
pub fn all_tags() -> Box<dyn TagPolicy> {
    Box::new(AllTags)
}
